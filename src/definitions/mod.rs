//! Serializable group definitions and bulk import into a [`GroupTree`].
//!
//! Reading and writing definition files is left to the caller; this module
//! only converts between JSON text, definitions and trees.

mod import;

pub use import::{export_definitions, import_definitions, ImportFailure, ImportReport};

use crate::groups::{GroupError, GroupErrorCode, GroupResult, HierarchyContext};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DefinitionKind {
    AllEntries,
    Keyword,
    Regex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDefinition {
    pub name: String,
    pub kind: DefinitionKind,
    #[serde(default)]
    pub context: HierarchyContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub expression: String,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<GroupDefinition>,
}

pub fn parse_definitions(raw: &str) -> GroupResult<Vec<GroupDefinition>> {
    serde_json::from_str(raw).map_err(|error| {
        GroupError::new(
            GroupErrorCode::ParseFailed,
            format!("failed to parse group definitions: {error}"),
        )
    })
}

pub fn serialize_definitions(definitions: &[GroupDefinition]) -> GroupResult<String> {
    serde_json::to_string_pretty(definitions).map_err(|error| {
        GroupError::new(
            GroupErrorCode::SerializeFailed,
            format!("failed to serialize group definitions: {error}"),
        )
    })
}
