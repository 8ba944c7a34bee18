use std::fmt;

const EXPRESSION_PREVIEW_CHARS: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError {
    pub expression: String,
    pub field: Option<String>,
    pub reason: String,
}

impl PatternError {
    pub fn new(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            field: None,
            reason: reason.into(),
        }
    }

    pub fn for_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl PatternError {
    /// The expression as shown in messages, cut short when very long.
    pub fn expression_preview(&self) -> String {
        let mut chars = self.expression.chars();
        let head: String = chars.by_ref().take(EXPRESSION_PREVIEW_CHARS).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expression = self.expression_preview();
        match &self.field {
            Some(field) => write!(
                f,
                "invalid pattern '{}' for field '{}': {}",
                expression, field, self.reason
            ),
            None => write!(f, "invalid pattern '{}': {}", expression, self.reason),
        }
    }
}


impl std::error::Error for PatternError {}
