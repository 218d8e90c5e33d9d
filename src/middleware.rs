pub mod auth;
pub mod pipeline;
