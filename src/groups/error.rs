use crate::errors::domain::{DomainError, ErrorCode};
use crate::matcher::PatternError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupErrorCode {
    InvalidPattern,
    EmptyName,
    EmptyField,
    UnknownNode,
    ParseFailed,
    SerializeFailed,
}

impl ErrorCode for GroupErrorCode {
    fn as_code_str(self) -> &'static str {
        match self {
            Self::InvalidPattern => "invalid_pattern",
            Self::EmptyName => "empty_name",
            Self::EmptyField => "empty_field",
            Self::UnknownNode => "unknown_node",
            Self::ParseFailed => "parse_failed",
            Self::SerializeFailed => "serialize_failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroupError {
    code: GroupErrorCode,
    message: String,
}

impl GroupError {
    pub fn new(code: GroupErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> GroupErrorCode {
        self.code
    }

    pub(crate) fn unknown_node(index: usize) -> Self {
        Self::new(
            GroupErrorCode::UnknownNode,
            format!("no group node with id {index}"),
        )
    }

    pub(crate) fn in_group(self, group: &str) -> Self {
        Self::new(self.code, format!("group '{group}': {}", self.message))
    }
}

impl From<PatternError> for GroupError {
    fn from(error: PatternError) -> Self {
        Self::new(GroupErrorCode::InvalidPattern, error.to_string())
    }
}

impl fmt::Display for GroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for GroupError {}

impl DomainError for GroupError {
    fn code_str(&self) -> &'static str {
        self.code.as_code_str()
    }

    fn message(&self) -> &str {
        &self.message
    }
}

pub type GroupResult<T> = Result<T, GroupError>;
