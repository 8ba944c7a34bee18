//! Field lookup over bibliographic records.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Read-only access to a record's named text fields.
pub trait FieldLookup {
    fn field(&self, name: &str) -> Option<&str>;
}

/// Minimal bibliographic entry: a citation key plus free-form fields.
///
/// Field names are case-insensitive and stored lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(default)]
    pub citation_key: Option<String>,
    #[serde(default)]
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_citation_key(key: impl Into<String>) -> Self {
        Self {
            citation_key: Some(key.into()),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_field(name, value);
        self
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(normalize_field_name(name), value.into());
    }

    pub fn clear_field(&mut self, name: &str) -> Option<String> {
        self.fields.remove(&normalize_field_name(name))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FieldLookup for Record {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&normalize_field_name(name))
            .map(String::as_str)
    }
}

impl FieldLookup for HashMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl FieldLookup for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl<T: FieldLookup + ?Sized> FieldLookup for &T {
    fn field(&self, name: &str) -> Option<&str> {
        (**self).field(name)
    }
}

fn normalize_field_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{FieldLookup, Record};
    use std::collections::HashMap;

    #[test]
    fn record_field_names_are_case_insensitive() {
        let record = Record::with_citation_key("knuth1973")
            .with_field("Author", "Donald Knuth")
            .with_field("YEAR", "1973");
        assert_eq!(record.field("author"), Some("Donald Knuth"));
        assert_eq!(record.field("Year"), Some("1973"));
        assert_eq!(record.field("title"), None);
    }

    #[test]
    fn clearing_a_field_makes_it_absent() {
        let mut record = Record::new().with_field("keywords", "sorting");
        assert_eq!(record.clear_field("Keywords").as_deref(), Some("sorting"));
        assert_eq!(record.field("keywords"), None);
    }

    #[test]
    fn hash_map_lookup_is_exact() {
        let mut map = HashMap::new();
        map.insert("title".to_string(), "TAOCP".to_string());
        assert_eq!(map.field("title"), Some("TAOCP"));
        assert_eq!(map.field("Title"), None);
    }
}
