//! User-defined groups and their matching/identity rules.

mod context;
mod error;

pub use context::HierarchyContext;
pub use error::{GroupError, GroupErrorCode, GroupResult};

use crate::matcher::{self, MatchMode, Matcher, PatternError};
use crate::record::FieldLookup;
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Field-scoped search: the field to inspect plus its compiled expression.
#[derive(Debug)]
pub struct SearchRule {
    field: String,
    expression: String,
    case_sensitive: bool,
    matcher: Matcher,
}

impl SearchRule {
    fn compile(
        field: &str,
        expression: &str,
        case_sensitive: bool,
        mode: MatchMode,
    ) -> Result<Self, PatternError> {
        let matcher = matcher::compile(expression, case_sensitive, mode)
            .map_err(|err| err.for_field(field))?;
        Ok(Self {
            field: field.to_string(),
            expression: expression.to_string(),
            case_sensitive,
            matcher,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// A missing field is tested as the empty string, so patterns that accept
    /// empty input also admit records without the field.
    fn matches<R: FieldLookup + ?Sized>(&self, record: &R) -> bool {
        match record.field(&self.field) {
            Some(value) => self.matcher.find(value),
            None => self.matcher.matches_empty(),
        }
    }

    fn deep_copy(&self) -> Self {
        Self {
            field: self.field.clone(),
            expression: self.expression.clone(),
            case_sensitive: self.case_sensitive,
            matcher: self.matcher.recompile(),
        }
    }
}

#[derive(Debug)]
pub enum GroupKind {
    /// Matches every record.
    AllEntries,
    /// Literal keyword containment.
    Keyword(SearchRule),
    /// Regular-expression search.
    Regex(SearchRule),
}

impl GroupKind {
    fn tag(&self) -> u8 {
        match self {
            Self::AllEntries => 0,
            Self::Keyword(_) => 1,
            Self::Regex(_) => 2,
        }
    }

    pub fn mode(&self) -> Option<MatchMode> {
        match self {
            Self::AllEntries => None,
            Self::Keyword(_) => Some(MatchMode::Keyword),
            Self::Regex(_) => Some(MatchMode::Regex),
        }
    }

    pub fn rule(&self) -> Option<&SearchRule> {
        match self {
            Self::AllEntries => None,
            Self::Keyword(rule) | Self::Regex(rule) => Some(rule),
        }
    }
}

/// A named filter over records.
///
/// Groups are immutable: edits such as [`Group::with_expression`] return a new
/// group with a freshly compiled matcher and leave the original untouched.
/// Equality and hashing are structural and ignore the compiled matcher;
/// groups of different kinds never compare equal.
pub struct Group {
    name: String,
    context: HierarchyContext,
    kind: GroupKind,
}

impl Group {
    pub fn all_entries(name: impl Into<String>) -> GroupResult<Self> {
        let name = validate_name(name.into())?;
        Ok(Self {
            name,
            context: HierarchyContext::Independent,
            kind: GroupKind::AllEntries,
        })
    }

    pub fn keyword(
        name: impl Into<String>,
        context: HierarchyContext,
        field: &str,
        expression: &str,
        case_sensitive: bool,
    ) -> GroupResult<Self> {
        Self::search(
            name.into(),
            context,
            MatchMode::Keyword,
            field,
            expression,
            case_sensitive,
        )
    }

    pub fn regex(
        name: impl Into<String>,
        context: HierarchyContext,
        field: &str,
        expression: &str,
        case_sensitive: bool,
    ) -> GroupResult<Self> {
        Self::search(
            name.into(),
            context,
            MatchMode::Regex,
            field,
            expression,
            case_sensitive,
        )
    }

    pub fn search(
        name: String,
        context: HierarchyContext,
        mode: MatchMode,
        field: &str,
        expression: &str,
        case_sensitive: bool,
    ) -> GroupResult<Self> {
        let name = validate_name(name)?;
        let field = field.trim();
        if field.is_empty() {
            return Err(GroupError::new(
                GroupErrorCode::EmptyField,
                format!("group '{name}' has no search field"),
            ));
        }
        let rule = SearchRule::compile(field, expression, case_sensitive, mode)
            .map_err(|err| GroupError::from(err).in_group(&name))?;
        debug!(group = %name, field = %field, expression = %expression, ?mode, "group built");
        Ok(Self {
            name,
            context,
            kind: wrap_rule(mode, rule),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context(&self) -> HierarchyContext {
        self.context
    }

    pub fn kind(&self) -> &GroupKind {
        &self.kind
    }

    pub fn search_rule(&self) -> Option<&SearchRule> {
        self.kind.rule()
    }

    /// Own membership test, without regard to the hierarchy.
    pub fn matches<R: FieldLookup + ?Sized>(&self, record: &R) -> bool {
        match &self.kind {
            GroupKind::AllEntries => true,
            GroupKind::Keyword(rule) | GroupKind::Regex(rule) => rule.matches(record),
        }
    }

    /// Returns a copy of this group searching for `expression` instead.
    ///
    /// On failure `self` is unchanged and remains usable.
    pub fn with_expression(
        &self,
        expression: &str,
        case_sensitive: bool,
    ) -> Result<Self, PatternError> {
        let (mode, rule) = match (self.kind.mode(), self.kind.rule()) {
            (Some(mode), Some(rule)) => (mode, rule),
            _ => {
                return Err(PatternError::new(
                    expression,
                    format!("group '{}' has no search field", self.name),
                ))
            }
        };
        let rule = SearchRule::compile(&rule.field, expression, case_sensitive, mode)?;
        debug!(group = %self.name, expression = %expression, case_sensitive, "group expression changed");
        Ok(Self {
            name: self.name.clone(),
            context: self.context,
            kind: wrap_rule(mode, rule),
        })
    }

    pub fn with_context(&self, context: HierarchyContext) -> Self {
        let mut copy = self.deep_copy();
        copy.context = context;
        copy
    }

    /// Independent copy with its own compiled matcher.
    pub fn deep_copy(&self) -> Self {
        let kind = match &self.kind {
            GroupKind::AllEntries => GroupKind::AllEntries,
            GroupKind::Keyword(rule) => GroupKind::Keyword(rule.deep_copy()),
            GroupKind::Regex(rule) => GroupKind::Regex(rule.deep_copy()),
        };
        Self {
            name: self.name.clone(),
            context: self.context,
            kind,
        }
    }

    fn identity(&self) -> (&str, HierarchyContext, u8, Option<(&str, &str, bool)>) {
        let rule = self
            .kind
            .rule()
            .map(|r| (r.field.as_str(), r.expression.as_str(), r.case_sensitive));
        (self.name.as_str(), self.context, self.kind.tag(), rule)
    }
}

fn wrap_rule(mode: MatchMode, rule: SearchRule) -> GroupKind {
    match mode {
        MatchMode::Keyword => GroupKind::Keyword(rule),
        MatchMode::Regex => GroupKind::Regex(rule),
    }
}

fn validate_name(name: String) -> GroupResult<String> {
    if name.trim().is_empty() {
        return Err(GroupError::new(
            GroupErrorCode::EmptyName,
            "group name must not be empty",
        ));
    }
    Ok(name)
}

impl Clone for Group {
    fn clone(&self) -> Self {
        self.deep_copy()
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Group {}

impl Hash for Group {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Group");
        out.field("name", &self.name).field("context", &self.context);
        match &self.kind {
            GroupKind::AllEntries => out.field("kind", &"allEntries"),
            GroupKind::Keyword(rule) | GroupKind::Regex(rule) => out
                .field("mode", &self.kind.mode())
                .field("field", &rule.field)
                .field("expression", &rule.expression)
                .field("case_sensitive", &rule.case_sensitive),
        };
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Group, GroupErrorCode, GroupKind, HierarchyContext};
    use crate::record::Record;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;
    use std::hash::{Hash, Hasher};

    fn hash_of(group: &Group) -> u64 {
        let mut hasher = DefaultHasher::new();
        group.hash(&mut hasher);
        hasher.finish()
    }

    fn author_regex(expr: &str, case_sensitive: bool) -> Group {
        Group::regex(
            "Knuth",
            HierarchyContext::Independent,
            "author",
            expr,
            case_sensitive,
        )
        .unwrap()
    }

    #[test]
    fn regex_group_matches_substring_anywhere() {
        let group = Group::regex(
            "Cats",
            HierarchyContext::Independent,
            "title",
            "cat",
            true,
        )
        .unwrap();
        let record = Record::new().with_field("title", "concatenate");
        assert!(group.matches(&record));
    }

    #[test]
    fn absent_field_matches_only_when_pattern_accepts_empty_input() {
        let record = Record::new().with_field("title", "Something");
        assert!(author_regex("", true).matches(&record));
        assert!(author_regex("a*", true).matches(&record));
        assert!(!author_regex("Knuth", true).matches(&record));
        let keyword = Group::keyword(
            "Empty",
            HierarchyContext::Independent,
            "author",
            "",
            false,
        )
        .unwrap();
        assert!(keyword.matches(&record));
    }

    #[test]
    fn present_field_requires_a_hit() {
        let group = author_regex("Kn.th", true);
        assert!(group.matches(&Record::new().with_field("author", "Donald Knuth")));
        assert!(!group.matches(&Record::new().with_field("author", "Jane Doe")));
        assert!(!author_regex("a*b", true).matches(&Record::new().with_field("author", "ccc")));
    }

    #[test]
    fn case_insensitive_group_ignores_value_case() {
        let group = author_regex("knuth", false);
        for value in ["Donald Knuth", "DONALD KNUTH", "donald knuth"] {
            assert!(group.matches(&Record::new().with_field("author", value)), "{value}");
        }
    }

    #[test]
    fn long_case_insensitive_keyword_group_builds() {
        let expression = "abcdefghij".repeat(20_000);
        let group = Group::keyword(
            "Long",
            HierarchyContext::Independent,
            "abstract",
            &expression,
            false,
        )
        .unwrap();
        let record = Record::new().with_field("abstract", expression.to_uppercase());
        assert!(group.matches(&record));
        assert!(!group.matches(&Record::new().with_field("abstract", "abcdefghij")));
    }

    #[test]
    fn keyword_group_matches_literally() {
        let group = Group::keyword(
            "Dotted",
            HierarchyContext::Independent,
            "keywords",
            "a.b",
            true,
        )
        .unwrap();
        assert!(group.matches(&Record::new().with_field("keywords", "x, a.b, y")));
        assert!(!group.matches(&Record::new().with_field("keywords", "axb")));
    }

    #[test]
    fn all_entries_matches_everything() {
        let group = Group::all_entries("All entries").unwrap();
        assert!(group.matches(&Record::new()));
        assert!(group.search_rule().is_none());
    }

    #[test]
    fn invalid_regex_names_group_field_and_expression() {
        let err = Group::regex(
            "Broken",
            HierarchyContext::Independent,
            "journal",
            "[unclosed",
            true,
        )
        .unwrap_err();
        assert_eq!(err.code(), GroupErrorCode::InvalidPattern);
        let text = err.to_string();
        assert!(text.contains("Broken"));
        assert!(text.contains("journal"));
        assert!(text.contains("[unclosed"));
    }

    #[test]
    fn rejects_empty_name_and_field() {
        let err = Group::keyword("  ", HierarchyContext::Independent, "title", "x", true)
            .unwrap_err();
        assert_eq!(err.code(), GroupErrorCode::EmptyName);
        let err = Group::keyword("T", HierarchyContext::Independent, " ", "x", true)
            .unwrap_err();
        assert_eq!(err.code(), GroupErrorCode::EmptyField);
    }

    #[test]
    fn equality_is_structural_and_hash_consistent() {
        let a = author_regex("Knuth", true);
        let b = author_regex("Knuth", true);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, author_regex("Knuth", false));
        assert_ne!(a, author_regex("Dijkstra", true));
        assert_ne!(a, a.with_context(HierarchyContext::Refining));
    }

    #[test]
    fn different_kinds_never_compare_equal() {
        let regex = author_regex("Knuth", true);
        let keyword = Group::keyword(
            "Knuth",
            HierarchyContext::Independent,
            "author",
            "Knuth",
            true,
        )
        .unwrap();
        assert_ne!(regex, keyword);
        assert_ne!(keyword, regex);
    }

    #[test]
    fn deep_copy_is_equal_but_independent() {
        let original = author_regex("Knuth", true);
        let copy = original.deep_copy();
        assert_eq!(original, copy);
        assert_eq!(hash_of(&original), hash_of(&copy));
        let rule_a = original.search_rule().unwrap().matcher() as *const _;
        let rule_b = copy.search_rule().unwrap().matcher() as *const _;
        assert_ne!(rule_a, rule_b);

        let edited = copy.with_expression("Dijkstra", true).unwrap();
        assert_eq!(original.search_rule().unwrap().expression(), "Knuth");
        assert_eq!(edited.search_rule().unwrap().expression(), "Dijkstra");
        assert_ne!(original, edited);
    }

    #[test]
    fn failed_edit_leaves_group_usable() {
        let group = author_regex("Knuth", true);
        let err = group.with_expression("(", true).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("author"));
        let record = Record::new().with_field("author", "Knuth");
        assert!(group.matches(&record));
    }

    #[test]
    fn edit_keeps_kind_and_recompiles() {
        let group = author_regex("Knuth", true);
        let edited = group.with_expression("knuth", false).unwrap();
        assert!(matches!(edited.kind(), GroupKind::Regex(_)));
        assert!(edited.matches(&Record::new().with_field("author", "KNUTH")));
        assert!(!group.matches(&Record::new().with_field("author", "KNUTH")));
    }

    #[test]
    fn equal_groups_dedupe_in_sets() {
        let mut set = HashSet::new();
        set.insert(author_regex("Knuth", true));
        set.insert(author_regex("Knuth", true).deep_copy());
        set.insert(author_regex("Knuth", false));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn matching_is_idempotent() {
        let group = author_regex("Kn", false);
        let record = Record::new().with_field("author", "Knuth");
        let first = group.matches(&record);
        for _ in 0..5 {
            assert_eq!(group.matches(&record), first);
        }
    }
}
