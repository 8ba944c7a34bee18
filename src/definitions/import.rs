use super::{DefinitionKind, GroupDefinition};
use crate::errors::{ApiError, DomainError};
use crate::groups::{Group, GroupResult};
use crate::matcher::MatchMode;
use crate::tree::{GroupTree, NodeId};
use serde::Serialize;
use tracing::{debug, warn};

/// A group that could not be built, identified by its path from the root.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    pub path: String,
    pub error: ApiError,
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub tree: GroupTree,
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Builds a tree from definitions, skipping groups that fail to build.
///
/// A failed group is dropped together with its subtree; its siblings and
/// ancestors are imported normally.
pub fn import_definitions(definitions: &[GroupDefinition]) -> ImportReport {
    let mut report = ImportReport::default();
    for definition in definitions {
        import_one(&mut report, None, definition, "");
    }
    debug!(
        groups = report.tree.len(),
        failures = report.failures.len(),
        "group definitions imported"
    );
    report
}

fn import_one(
    report: &mut ImportReport,
    parent: Option<NodeId>,
    definition: &GroupDefinition,
    parent_path: &str,
) {
    let path = if parent_path.is_empty() {
        definition.name.clone()
    } else {
        format!("{parent_path} / {}", definition.name)
    };

    let group = match build_group(definition) {
        Ok(group) => group,
        Err(error) => {
            warn!(path = %path, error = %error, "skipping group definition");
            report.failures.push(ImportFailure {
                path,
                error: error.to_api_error(),
            });
            return;
        }
    };

    let id = match parent {
        Some(parent) => match report.tree.add_child(parent, group) {
            Ok(id) => id,
            Err(error) => {
                report.failures.push(ImportFailure {
                    path,
                    error: error.to_api_error(),
                });
                return;
            }
        },
        None => report.tree.add_root(group),
    };

    for child in &definition.children {
        import_one(report, Some(id), child, &path);
    }
}

fn build_group(definition: &GroupDefinition) -> GroupResult<Group> {
    let mode = match definition.kind {
        DefinitionKind::AllEntries => {
            return Ok(Group::all_entries(definition.name.clone())?
                .with_context(definition.context))
        }
        DefinitionKind::Keyword => MatchMode::Keyword,
        DefinitionKind::Regex => MatchMode::Regex,
    };
    Group::search(
        definition.name.clone(),
        definition.context,
        mode,
        definition.field.as_deref().unwrap_or_default(),
        &definition.expression,
        definition.case_sensitive,
    )
}

/// Converts a tree back into definitions, roots first.
pub fn export_definitions(tree: &GroupTree) -> Vec<GroupDefinition> {
    tree.roots()
        .iter()
        .filter_map(|root| export_node(tree, *root))
        .collect()
}

fn export_node(tree: &GroupTree, id: NodeId) -> Option<GroupDefinition> {
    let group = tree.get(id)?;
    let kind = match group.kind().mode() {
        None => DefinitionKind::AllEntries,
        Some(MatchMode::Keyword) => DefinitionKind::Keyword,
        Some(MatchMode::Regex) => DefinitionKind::Regex,
    };
    let rule = group.search_rule();
    Some(GroupDefinition {
        name: group.name().to_string(),
        kind,
        context: group.context(),
        field: rule.map(|r| r.field().to_string()),
        expression: rule.map(|r| r.expression().to_string()).unwrap_or_default(),
        case_sensitive: rule.map(|r| r.case_sensitive()).unwrap_or(false),
        children: tree
            .children(id)
            .iter()
            .filter_map(|child| export_node(tree, *child))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::{export_definitions, import_definitions};
    use crate::definitions::parse_definitions;
    use crate::record::Record;

    const LIBRARY: &str = r#"[
        {
            "name": "All entries",
            "kind": "allEntries",
            "children": [
                {
                    "name": "Knuth",
                    "kind": "keyword",
                    "context": "including",
                    "field": "author",
                    "expression": "knuth",
                    "children": [
                        { "name": "1975", "kind": "regex", "field": "year", "expression": "^1975$" }
                    ]
                },
                {
                    "name": "Broken",
                    "kind": "regex",
                    "field": "journal",
                    "expression": "[unclosed",
                    "children": [
                        { "name": "Lost", "kind": "keyword", "field": "title", "expression": "x" }
                    ]
                },
                { "name": "No field", "kind": "keyword", "expression": "x" },
                { "name": "Sorting", "kind": "keyword", "field": "title", "expression": "sort" }
            ]
        }
    ]"#;

    #[test]
    fn import_continues_past_invalid_groups() {
        let report = import_definitions(&parse_definitions(LIBRARY).unwrap());
        assert!(!report.is_complete());
        assert_eq!(report.failures.len(), 2);

        let broken = &report.failures[0];
        assert_eq!(broken.path, "All entries / Broken");
        assert_eq!(broken.error.code, "invalid_pattern");
        assert!(broken.error.message.contains("[unclosed"));
        assert!(broken.error.message.contains("journal"));
        assert_eq!(report.failures[1].error.code, "empty_field");

        let tree = &report.tree;
        assert_eq!(tree.len(), 4);
        assert!(tree.find_by_name("Lost").is_none());
        assert!(tree.find_by_name("Sorting").is_some());

        let knuth = tree.find_by_name("Knuth").unwrap();
        let record = Record::new()
            .with_field("author", "Jane Doe")
            .with_field("year", "1975");
        assert!(tree.node_matches(knuth, &record));
    }

    #[test]
    fn export_reproduces_imported_definitions() {
        let defs = parse_definitions(
            r#"[{
                "name": "Knuth",
                "kind": "regex",
                "context": "refining",
                "field": "author",
                "expression": "Kn.th",
                "caseSensitive": true,
                "children": [{ "name": "All", "kind": "allEntries" }]
            }]"#,
        )
        .unwrap();
        let report = import_definitions(&defs);
        assert!(report.is_complete());
        assert_eq!(export_definitions(&report.tree), defs);
    }

    #[test]
    fn failure_report_serializes_camel_case() {
        let report = import_definitions(&parse_definitions(LIBRARY).unwrap());
        let json = serde_json::to_value(&report.failures[0]).unwrap();
        assert_eq!(json["path"], "All entries / Broken");
        assert_eq!(json["error"]["code"], "invalid_pattern");
    }
}
