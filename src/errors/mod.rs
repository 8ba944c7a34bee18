pub mod api_error;
pub mod domain;

pub use api_error::ApiError;
pub use domain::{DomainError, ErrorCode};
