//! Compiles user search expressions into reusable text matchers.
//!
//! Matching is always an unanchored search: a hit anywhere in the text counts,
//! so `cat` finds `concatenate`.

mod error;

pub use error::PatternError;

use regex::{Regex, RegexBuilder};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// The expression is taken literally.
    Keyword,
    /// The expression is a regular expression.
    Regex,
}

#[derive(Debug, Clone)]
enum Program {
    /// Needle is stored lower-cased when matching ignores case.
    Literal { needle: String, fold_case: bool },
    Regex(Regex),
}

#[derive(Debug)]
pub struct Matcher {
    program: Program,
    expression: String,
    case_sensitive: bool,
    mode: MatchMode,
}

/// Keyword mode cannot fail; only regex syntax (or a regex too large to
/// compile) produces a `PatternError`.
pub fn compile(
    expression: &str,
    case_sensitive: bool,
    mode: MatchMode,
) -> Result<Matcher, PatternError> {
    let program = match mode {
        MatchMode::Keyword => Program::Literal {
            needle: if case_sensitive {
                expression.to_string()
            } else {
                expression.to_lowercase()
            },
            fold_case: !case_sensitive,
        },
        MatchMode::Regex => RegexBuilder::new(expression)
            .case_insensitive(!case_sensitive)
            .build()
            .map(Program::Regex)
            .map_err(|err| {
                debug!(expression_len = expression.len(), error = %err, "pattern compile failed");
                PatternError::new(expression, describe_regex_error(&err))
            })?,
    };
    Ok(Matcher {
        program,
        expression: expression.to_string(),
        case_sensitive,
        mode,
    })
}

/// Syntax errors echo the whole pattern; keep only the trailing `error:` line.
fn describe_regex_error(err: &regex::Error) -> String {
    let text = err.to_string();
    let reason = text
        .lines()
        .rev()
        .find_map(|line| line.trim().strip_prefix("error:"))
        .map(|reason| reason.trim().to_string());
    reason.unwrap_or(text)
}

impl Matcher {
    pub fn find(&self, text: &str) -> bool {
        match &self.program {
            Program::Literal {
                needle,
                fold_case: true,
            } => text.to_lowercase().contains(needle.as_str()),
            Program::Literal { needle, .. } => text.contains(needle.as_str()),
            Program::Regex(regex) => regex.is_match(text),
        }
    }

    pub fn matches_empty(&self) -> bool {
        self.find("")
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Builds an independent matcher from the same expression and options.
    pub fn recompile(&self) -> Matcher {
        match compile(&self.expression, self.case_sensitive, self.mode) {
            Ok(matcher) => matcher,
            // Same inputs already compiled once; keep the existing program.
            Err(_) => Matcher {
                program: self.program.clone(),
                expression: self.expression.clone(),
                case_sensitive: self.case_sensitive,
                mode: self.mode,
            },
        }
    }
}
