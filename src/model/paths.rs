//! Path resolution over JSON responses
//!
//! Paginators and waiter acceptors address response fields with dot-notation
//! paths. A segment is a field name or a numeric array index; a segment
//! suffixed with `[]` flattens the array it names, so
//! `Reservations[].Instances[].State.Name` resolves to every instance state
//! across all reservations.

use serde_json::Value;

/// Resolve a scalar path to a single value.
///
/// Returns `None` when any segment is missing or the path is empty. Flatten
/// segments (`[]`) are not valid here; use [`resolve_collection`].
pub fn resolve<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }

    let mut current = value;
    for part in path.split('.') {
        current = if let Ok(idx) = part.parse::<usize>() {
            current.get(idx)?
        } else {
            current.get(part)?
        };
    }

    Some(current)
}

/// Resolve a path that may fan out over arrays, returning every match.
///
/// Missing segments drop silently, so an absent field yields an empty
/// collection rather than an error.
pub fn resolve_collection(value: &Value, path: &str) -> Vec<Value> {
    if path.is_empty() {
        return Vec::new();
    }

    let mut current: Vec<&Value> = vec![value];
    for part in path.split('.') {
        let (field, flatten) = match part.strip_suffix("[]") {
            Some(field) => (field, true),
            None => (part, false),
        };

        let mut next = Vec::new();
        for node in current {
            let child = if field.is_empty() {
                Some(node)
            } else if let Ok(idx) = field.parse::<usize>() {
                node.get(idx)
            } else {
                node.get(field)
            };

            let Some(child) = child else { continue };

            if flatten {
                if let Some(arr) = child.as_array() {
                    next.extend(arr.iter());
                }
            } else {
                next.push(child);
            }
        }
        current = next;
    }

    current.into_iter().cloned().collect()
}

/// Whether a resolved value counts as a present continuation token.
///
/// Servers signal exhaustion with an absent field, `null`, an empty string,
/// or an empty array; all of those read as "no token".
pub fn is_present_token(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(arr)) => !arr.is_empty(),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "Reservations": [
                {"Instances": [
                    {"State": {"Name": "running"}},
                    {"State": {"Name": "pending"}}
                ]},
                {"Instances": [
                    {"State": {"Name": "running"}}
                ]}
            ],
            "NextToken": "abc",
            "Count": 3
        })
    }

    #[test]
    fn resolve_walks_nested_fields_and_indices() {
        let value = sample();
        assert_eq!(
            resolve(&value, "Reservations.0.Instances.1.State.Name"),
            Some(&json!("pending"))
        );
        assert_eq!(resolve(&value, "NextToken"), Some(&json!("abc")));
        assert_eq!(resolve(&value, "Missing.Field"), None);
        assert_eq!(resolve(&value, ""), None);
    }

    #[test]
    fn resolve_collection_flattens_arrays() {
        let value = sample();
        let states = resolve_collection(&value, "Reservations[].Instances[].State.Name");
        assert_eq!(states, vec![json!("running"), json!("pending"), json!("running")]);
    }

    #[test]
    fn resolve_collection_is_empty_on_missing_fields() {
        let value = sample();
        assert!(resolve_collection(&value, "Reservations[].Missing[]").is_empty());
        assert!(resolve_collection(&value, "").is_empty());
    }

    #[test]
    fn token_presence_rules() {
        assert!(!is_present_token(None));
        assert!(!is_present_token(Some(&Value::Null)));
        assert!(!is_present_token(Some(&json!(""))));
        assert!(!is_present_token(Some(&json!([]))));
        assert!(is_present_token(Some(&json!("abc"))));
        assert!(is_present_token(Some(&json!(42))));
    }
}
