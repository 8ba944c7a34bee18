//! Group membership engine for bibliographic records.
//!
//! A [`Group`] decides whether a record belongs to it by searching one of the
//! record's fields. Groups are arranged in a [`GroupTree`] where each node's
//! [`HierarchyContext`] decides how its own result combines with its
//! children's: ignored, unioned or intersected.
//!
//! ```
//! use bibgroups::{Group, GroupTree, HierarchyContext, Record};
//!
//! let mut tree = GroupTree::new();
//! let knuth = tree.add_root(
//!     Group::keyword("Knuth", HierarchyContext::Including, "author", "knuth", false).unwrap(),
//! );
//! tree.add_child(
//!     knuth,
//!     Group::regex("1975", HierarchyContext::Independent, "year", "^1975$", true).unwrap(),
//! )
//! .unwrap();
//!
//! let record = Record::new().with_field("author", "Jane Doe").with_field("year", "1975");
//! assert_eq!(tree.matches(&record), vec![true]);
//! ```

pub mod definitions;
pub mod errors;
pub mod groups;
pub mod logging;
pub mod matcher;
pub mod record;
pub mod tree;

pub use definitions::{
    export_definitions, import_definitions, parse_definitions, serialize_definitions,
    DefinitionKind, GroupDefinition, ImportFailure, ImportReport,
};
pub use errors::{ApiError, DomainError};
pub use groups::{
    Group, GroupError, GroupErrorCode, GroupKind, GroupResult, HierarchyContext, SearchRule,
};
pub use matcher::{compile, MatchMode, Matcher, PatternError};
pub use record::{FieldLookup, Record};
pub use tree::{GroupTree, HierarchyNode, NodeId};
