//! Request/response types shared by the HTTP layer

pub mod audit_dto;

use serde::Serialize;

/// Envelope of every JSON response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub is_successful: bool,
    pub data: Option<T>,
    pub error_msg: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            is_successful: true,
            data: Some(data),
            error_msg: None,
        }
    }
}
