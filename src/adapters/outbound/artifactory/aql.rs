//! Artifactory Query Language builders for pattern searches.
//!
//! The query narrows results to the repository, its labels and a coarse
//! folder range; the exact wildcard match happens client-side.

use serde_json::{json, Map, Value};

use crate::{
    domain::value_objects::LabelSet,
    services::path_mapper::{self, WILDCARD},
};

const INCLUDED_FIELDS: &[&str] = &["repo", "path", "name", "size", "modified"];

/// Build `items.find(...).include(...)` for a `<repo>/<path>` pattern
pub fn search_query(pattern: &str, properties: &LabelSet, recursive: bool) -> String {
    let (repo, path_pattern) = path_mapper::split_pattern(pattern);

    let mut criteria = Map::new();
    criteria.insert("repo".to_string(), json!(repo));
    criteria.insert("type".to_string(), json!("file"));

    if let Some(folder_clause) = folder_clause(path_pattern, recursive) {
        criteria.insert("$or".to_string(), folder_clause);
    }

    if !properties.is_empty() {
        let props: Vec<Value> = properties
            .iter()
            .map(|label| json!({ format!("@{}", label.name): label.value }))
            .collect();
        criteria.insert("$and".to_string(), Value::Array(props));
    }

    let include = INCLUDED_FIELDS
        .iter()
        .map(|f| format!("\"{}\"", f))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "items.find({}).include({})",
        Value::Object(criteria),
        include
    )
}

/// Folders that can hold matches: the literal folder before the first wildcard,
/// plus everything below it when recursive
fn folder_clause(path_pattern: &str, recursive: bool) -> Option<Value> {
    let literal = path_pattern
        .split(WILDCARD)
        .next()
        .unwrap_or_default();

    let folder = match literal.rsplit_once('/') {
        Some((folder, _)) => folder,
        None if recursive => return None,
        None => ".",
    };

    let mut alternatives = vec![json!({ "path": folder })];
    if recursive {
        alternatives.push(json!({ "path": { "$match": format!("{}/*", folder) } }));
    }
    Some(Value::Array(alternatives))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria(query: &str) -> Value {
        let start = "items.find(".len();
        let end = query.find(").include(").unwrap();
        serde_json::from_str(&query[start..end]).unwrap()
    }

    #[test]
    fn test_prefix_query_narrows_to_folder() {
        let query = search_query("backups/x/1*", &LabelSet::default(), true);
        let parsed = criteria(&query);

        assert_eq!(parsed["repo"], "backups");
        assert_eq!(parsed["type"], "file");
        assert_eq!(parsed["$or"][0]["path"], "x");
        assert_eq!(parsed["$or"][1]["path"]["$match"], "x/*");
        assert!(query.ends_with(".include(\"repo\",\"path\",\"name\",\"size\",\"modified\")"));
    }

    #[test]
    fn test_top_level_recursive_query_has_no_folder_clause() {
        let parsed = criteria(&search_query("backups/*", &LabelSet::default(), true));
        assert!(parsed.get("$or").is_none());
    }

    #[test]
    fn test_labels_become_property_clauses() {
        let labels = LabelSet::parse("env=prod;team=core").unwrap();
        let parsed = criteria(&search_query("backups/a/b", &labels, true));

        assert_eq!(parsed["$and"][0]["@env"], "prod");
        assert_eq!(parsed["$and"][1]["@team"], "core");
        assert_eq!(parsed["$or"][0]["path"], "a");
    }

    #[test]
    fn test_non_recursive_root_query_stays_in_root_folder() {
        let parsed = criteria(&search_query("backups/x*", &LabelSet::default(), false));
        assert_eq!(parsed["$or"][0]["path"], ".");
        assert_eq!(parsed["$or"].as_array().unwrap().len(), 1);
    }
}
