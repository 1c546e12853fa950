//! # Environment & Variables
//!
//! Variables fill `{{variable}}` placeholders in scenario paths and in
//! generated values. They come from three places; a higher one overrides a
//! lower one: `--var` overrides > variables file > collection defaults.

use std::collections::BTreeMap;
use std::ops::Range;

use serde_json::Value;

pub type Variables = BTreeMap<String, String>;

/// Merge variable sources, respecting precedence.
pub fn resolve(collection: &Variables, file: &Variables, overrides: &Variables) -> Variables {
    let mut resolved = collection.clone();

    for (key, value) in file.iter().chain(overrides) {
        if !key.is_empty() {
            resolved.insert(key.clone(), value.clone());
        }
    }

    resolved
}

/// Interpolate `{{variable}}` placeholders in the given text, left to right
/// in one pass. Substituted values are not scanned again; unknown
/// placeholders are left in place.
pub fn interpolate(text: &str, variables: &Variables) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some((span, name)) = next_placeholder(rest) {
        result.push_str(&rest[..span.start]);
        match variables.get(name) {
            Some(value) => result.push_str(value),
            None => result.push_str(&rest[span.clone()]),
        }
        rest = &rest[span.end..];
    }

    result.push_str(rest);
    result
}

/// Interpolate every string inside a JSON value.
pub fn interpolate_value(value: &Value, variables: &Variables) -> Value {
    match value {
        Value::String(text) => Value::String(interpolate(text, variables)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| interpolate_value(item, variables))
                .collect(),
        ),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, item)| (key.clone(), interpolate_value(item, variables)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Names of placeholders still present in `text`.
pub fn unresolved(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = text;

    while let Some((span, name)) = next_placeholder(rest) {
        if !name.is_empty() {
            names.push(name.to_string());
        }
        rest = &rest[span.end..];
    }

    names
}

/// Byte span of the next `{{...}}` in `text` and its trimmed name.
fn next_placeholder(text: &str) -> Option<(Range<usize>, &str)> {
    let start = text.find("{{")?;
    let len = text[start + 2..].find("}}")?;
    let end = start + 2 + len + 2;
    Some((start..end, text[start + 2..start + 2 + len].trim()))
}

/// Parse a `key=value` pair as given on the command line.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("Invalid variable format: `{raw}` (expected KEY=VALUE)"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Variable name cannot be empty: `{raw}`"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn resolve_collection_vars_only() {
        let resolved = resolve(&vars(&[("host", "localhost")]), &Variables::new(), &Variables::new());
        assert_eq!(resolved.get("host").unwrap(), "localhost");
    }

    #[test]
    fn resolve_file_overrides_collection() {
        let resolved = resolve(
            &vars(&[("host", "localhost"), ("port", "8080")]),
            &vars(&[("host", "dev.example.com")]),
            &Variables::new(),
        );
        assert_eq!(resolved.get("host").unwrap(), "dev.example.com");
        assert_eq!(resolved.get("port").unwrap(), "8080");
    }

    #[test]
    fn resolve_overrides_win() {
        let resolved = resolve(
            &vars(&[("host", "localhost")]),
            &vars(&[("host", "dev.example.com")]),
            &vars(&[("host", "cli.example.com")]),
        );
        assert_eq!(resolved.get("host").unwrap(), "cli.example.com");
    }

    #[test]
    fn interpolate_replaces_placeholders() {
        let variables = vars(&[("host", "api.example.com"), ("port", "8080")]);
        let result = interpolate("https://{{host}}:{{port}}/api", &variables);
        assert_eq!(result, "https://api.example.com:8080/api");
    }

    #[test]
    fn interpolate_leaves_unknown_placeholders() {
        let result = interpolate("{{unknown}}", &Variables::new());
        assert_eq!(result, "{{unknown}}");
        assert_eq!(unresolved(&result), vec!["unknown".to_string()]);
    }

    #[test]
    fn interpolate_does_not_expand_substituted_values() {
        let variables = vars(&[("a", "{{z}}"), ("z", "{{a}}")]);
        assert_eq!(interpolate("{{a}}-{{z}}", &variables), "{{z}}-{{a}}");

        let variables = vars(&[("z", "{{a}}"), ("a", "x")]);
        assert_eq!(interpolate("{{z}}/{{a}}", &variables), "{{a}}/x");
    }

    #[test]
    fn interpolate_keeps_unterminated_and_empty_placeholders() {
        let variables = vars(&[("id", "7")]);
        assert_eq!(interpolate("/{{}}/{{id}}/{{id", &variables), "/{{}}/7/{{id");
    }

    #[test]
    fn interpolate_value_walks_nested_json() {
        let variables = vars(&[("plan_id", "p-1")]);
        let value = json!({"ids": ["{{plan_id}}", 3], "plan": "{{plan_id}}", "n": null});
        assert_eq!(
            interpolate_value(&value, &variables),
            json!({"ids": ["p-1", 3], "plan": "p-1", "n": null})
        );
    }

    #[test]
    fn unresolved_lists_every_placeholder() {
        assert_eq!(
            unresolved("/community-plan/{{community_id}}/{{ plan_id }}/"),
            vec!["community_id".to_string(), "plan_id".to_string()]
        );
        assert!(unresolved("/plan/{{/").is_empty());
    }

    #[test]
    fn parse_assignment_splits_on_first_equals() {
        assert_eq!(
            parse_assignment("token=a=b").unwrap(),
            ("token".to_string(), "a=b".to_string())
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }
}
