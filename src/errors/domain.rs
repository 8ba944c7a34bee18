use crate::errors::api_error::ApiError;

pub trait ErrorCode {
    #[allow(clippy::wrong_self_convention)]
    fn as_code_str(self) -> &'static str;
}

pub trait DomainError: std::error::Error {
    fn code_str(&self) -> &'static str;
    fn message(&self) -> &str;

    fn to_api_error(&self) -> ApiError {
        ApiError::new(self.code_str(), self.message())
    }
}
