pub mod documents;
pub mod rules;

pub use documents::CpfPolicy;
