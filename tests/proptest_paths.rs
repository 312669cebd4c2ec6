//! Property-based tests using proptest
//!
//! These tests verify the path-resolution rules that paginators and
//! waiter acceptors depend on, using randomized response shapes.

use awscall::model::paths::{is_present_token, resolve, resolve_collection};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Generate arbitrary widget data resembling a list response element
fn arb_widget() -> impl Strategy<Value = Value> {
    (
        "[a-z][a-z0-9-]{0,20}",
        prop_oneof!["ready", "creating", "deleting", "corrupt"],
        0u64..1000,
    )
        .prop_map(|(id, state, size)| {
            json!({
                "Id": id,
                "State": state,
                "Size": size
            })
        })
}

/// Generate a list response page with an optional continuation token
fn arb_page() -> impl Strategy<Value = Value> {
    (
        prop::collection::vec(arb_widget(), 0..20),
        prop::option::of("[A-Za-z0-9]{1,12}"),
    )
        .prop_map(|(widgets, token)| match token {
            Some(token) => json!({"Widgets": widgets, "NextToken": token}),
            None => json!({"Widgets": widgets}),
        })
}

proptest! {
    /// Resolving a field every element carries returns one value per element
    #[test]
    fn flatten_visits_every_element(page in arb_page()) {
        let widgets = page["Widgets"].as_array().unwrap().len();
        let states = resolve_collection(&page, "Widgets[].State");
        prop_assert_eq!(states.len(), widgets);
        for state in &states {
            prop_assert!(state.is_string());
        }
    }

    /// A scalar resolve agrees with indexing into the flattened collection
    #[test]
    fn scalar_resolve_matches_collection_order(page in arb_page()) {
        let ids = resolve_collection(&page, "Widgets[].Id");
        for (idx, id) in ids.iter().enumerate() {
            let path = format!("Widgets.{idx}.Id");
            prop_assert_eq!(resolve(&page, &path), Some(id));
        }
    }

    /// Resolving a missing path is always None, never a panic
    #[test]
    fn missing_paths_resolve_to_none(page in arb_page(), field in "[A-Z][a-z]{1,8}") {
        prop_assume!(field != "Widgets" && field != "NextToken");
        prop_assert!(resolve(&page, &field).is_none());
        let collection_path = format!("{}[].X", field);
        prop_assert!(resolve_collection(&page, &collection_path).is_empty());
    }

    /// Token presence tracks whether the server sent a non-empty token
    #[test]
    fn token_presence_matches_page_shape(page in arb_page()) {
        let token = resolve(&page, "NextToken");
        prop_assert_eq!(is_present_token(token), page.get("NextToken").is_some());
    }

    /// Resolution never mutates its input
    #[test]
    fn resolution_is_read_only(page in arb_page()) {
        let before = page.clone();
        let _ = resolve(&page, "Widgets.0.State");
        let _ = resolve_collection(&page, "Widgets[].State");
        prop_assert_eq!(page, before);
    }
}

/// Tests for cursor plumbing invariants
mod cursor_tests {
    use super::*;

    /// Writing a token into parameters then resolving it round-trips
    fn write_token(base: &Value, name: &str, token: &Value) -> Value {
        let mut params = base.clone();
        if let Value::Object(map) = &mut params {
            map.insert(name.to_string(), token.clone());
        }
        params
    }

    proptest! {
        /// An inserted cursor is visible at its input-token key
        #[test]
        fn inserted_cursor_resolves(token in "[A-Za-z0-9]{1,16}") {
            let params = write_token(&json!({"MaxResults": 10}), "NextToken", &json!(token));
            prop_assert_eq!(resolve(&params, "NextToken"), Some(&json!(token)));
            prop_assert!(is_present_token(resolve(&params, "NextToken")));
        }

        /// Empty-string and empty-array tokens read as absent
        #[test]
        fn empty_cursor_values_are_absent(_dummy in any::<bool>()) {
            prop_assert!(!is_present_token(Some(&json!(""))));
            prop_assert!(!is_present_token(Some(&json!([]))));
            prop_assert!(!is_present_token(Some(&Value::Null)));
            prop_assert!(!is_present_token(None));
        }
    }
}
