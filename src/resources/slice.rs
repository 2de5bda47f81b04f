use serde_json::Value;

use crate::mvi::{Intent, Reducer, SliceState};
use crate::session::AuthStatus;

/// List state plus the status of the latest create/update/delete.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSlice {
    pub items: Vec<Value>,
    pub status: AuthStatus,
    pub error: Option<String>,
    pub mutation_status: AuthStatus,
    pub mutation_error: Option<String>,
}

impl SliceState for ResourceSlice {}

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceIntent {
    FetchStarted,
    FetchSucceeded(Vec<Value>),
    FetchFailed(String),
    /// A single item loaded by id; replaces the item with the same key or
    /// goes to the front of the list.
    ItemFetched(Value),
    MutationStarted,
    MutationSucceeded,
    MutationFailed(String),
}

impl Intent for ResourceIntent {}

pub struct ResourceReducer;

impl Reducer for ResourceReducer {
    type State = ResourceSlice;
    type Intent = ResourceIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            ResourceIntent::FetchStarted => ResourceSlice {
                status: AuthStatus::Loading,
                error: None,
                ..state
            },
            ResourceIntent::FetchSucceeded(items) => ResourceSlice {
                items,
                status: AuthStatus::Succeeded,
                ..state
            },
            // previous items stay visible after a failed refresh
            ResourceIntent::FetchFailed(message) => ResourceSlice {
                status: AuthStatus::Failed,
                error: Some(message),
                ..state
            },
            ResourceIntent::ItemFetched(item) => {
                let mut items = state.items;
                let existing = item_key(&item)
                    .and_then(|key| items.iter().position(|i| item_key(i) == Some(key)));
                match existing {
                    Some(idx) => items[idx] = item,
                    None => items.insert(0, item),
                }
                ResourceSlice { items, ..state }
            }
            ResourceIntent::MutationStarted => ResourceSlice {
                mutation_status: AuthStatus::Loading,
                mutation_error: None,
                ..state
            },
            ResourceIntent::MutationSucceeded => ResourceSlice {
                mutation_status: AuthStatus::Succeeded,
                ..state
            },
            ResourceIntent::MutationFailed(message) => ResourceSlice {
                mutation_status: AuthStatus::Failed,
                mutation_error: Some(message),
                ..state
            },
        }
    }
}

/// Backend identity of an item: `_id`, else `id`.
fn item_key(item: &Value) -> Option<&Value> {
    item.get("_id").or_else(|| item.get("id"))
}

/// Normalize a list response: a bare array, or an object wrapping one
/// under `data` or `items`.
pub fn items_from_response(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        Value::Object(mut map) => {
            for key in ["data", "items"] {
                if let Some(Value::Array(items)) = map.remove(key) {
                    return items;
                }
            }
            vec![Value::Object(map)]
        }
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fetch_cycle() {
        let state = ResourceReducer::reduce(ResourceSlice::default(), ResourceIntent::FetchStarted);
        assert_eq!(state.status, AuthStatus::Loading);

        let state = ResourceReducer::reduce(
            state,
            ResourceIntent::FetchSucceeded(vec![json!({"id": 1})]),
        );
        assert_eq!(state.status, AuthStatus::Succeeded);
        assert_eq!(state.items.len(), 1);

        let state = ResourceReducer::reduce(state, ResourceIntent::FetchStarted);
        let state = ResourceReducer::reduce(
            state,
            ResourceIntent::FetchFailed("Failed to load blogs".to_string()),
        );
        assert_eq!(state.status, AuthStatus::Failed);
        assert_eq!(state.error.as_deref(), Some("Failed to load blogs"));
        assert_eq!(state.items.len(), 1);
    }

    #[test]
    fn test_mutation_cycle_does_not_touch_list_status() {
        let state = ResourceReducer::reduce(ResourceSlice::default(), ResourceIntent::MutationStarted);
        let state = ResourceReducer::reduce(
            state,
            ResourceIntent::MutationFailed("Failed to create job".to_string()),
        );
        assert_eq!(state.mutation_status, AuthStatus::Failed);
        assert_eq!(state.status, AuthStatus::Idle);

        let state = ResourceReducer::reduce(state, ResourceIntent::MutationStarted);
        assert_eq!(state.mutation_error, None);
    }

    #[test]
    fn test_item_fetched_upserts_by_id() {
        let state = ResourceSlice {
            items: vec![json!({"_id": "a1", "status": "new"}), json!({"_id": "a2"})],
            ..ResourceSlice::default()
        };

        let state = ResourceReducer::reduce(
            state,
            ResourceIntent::ItemFetched(json!({"_id": "a2", "status": "reviewed"})),
        );
        assert_eq!(state.items.len(), 2);
        assert_eq!(state.items[1]["status"], "reviewed");

        let state = ResourceReducer::reduce(state, ResourceIntent::ItemFetched(json!({"_id": "a3"})));
        assert_eq!(state.items.len(), 3);
        assert_eq!(state.items[0]["_id"], "a3");
        assert_eq!(state.status, AuthStatus::Idle);
    }

    #[test]
    fn test_items_from_response() {
        assert_eq!(items_from_response(json!([1, 2])).len(), 2);
        assert_eq!(items_from_response(json!({"data": [1, 2, 3]})).len(), 3);
        assert_eq!(items_from_response(json!({"items": []})).len(), 0);
        assert!(items_from_response(Value::Null).is_empty());
        assert_eq!(items_from_response(json!({"id": 9})), vec![json!({"id": 9})]);
    }
}
