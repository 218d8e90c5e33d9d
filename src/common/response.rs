// src/common/response.rs

use serde::Serialize;
use utoipa::ToSchema;

/// Envelope padrão das respostas de sucesso: `{success, data?, count?, message?}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse { success: true, data: Some(data), count: None, message: None }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn list(data: Vec<T>) -> Self {
        let count = data.len();
        ApiResponse { success: true, data: Some(data), count: Some(count), message: None }
    }

    /// Uma página da listagem; `count` é o total da coleção.
    pub fn page(data: Vec<T>, total: u64) -> Self {
        let count = usize::try_from(total).unwrap_or(usize::MAX);
        ApiResponse { success: true, data: Some(data), count: Some(count), message: None }
    }
}
