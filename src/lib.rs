use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Metadata row returned by `GET /api/v1/files/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileMetadata {
    pub name: String,
    pub file_type: String,
    pub file_size: u64,
    pub created_at: String,
}

pub mod auth;
pub mod credentials;
pub mod theme;
pub mod validate;

#[cfg(feature = "frontend")]
pub mod frontend;
#[cfg(feature = "frontend")]
pub mod gateway;
#[cfg(feature = "frontend")]
pub mod session;

#[cfg(feature = "frontend")]
pub use frontend::*;
