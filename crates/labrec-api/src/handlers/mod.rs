//! HTTP handlers, one module per record family.

pub mod auth;
pub mod experiments;
pub mod health;
pub mod literature;
pub mod logs;
pub mod progress;

use serde::{Deserialize, Serialize};

/// `?username=` query accepted by every list endpoint.
#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    pub username: Option<String>,
}

/// `{success: true, data: [...]}` envelope for list endpoints.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
