//! Request filters ("queues").
//!
//! `GET_REQUEST_FILTERS` returns the filters as `Filters/parameter` pairs
//! where `name` is the filter id and `value` its display name. The server
//! is known to omit some filters from this list.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{OneOrMany, Parameter};
use crate::error::SdpError;

/// Locations of the filter list, with and without the `API/response` prefix.
const FILTER_PATHS: [&str; 2] = [
    "/API/response/operation/Details/Filters/parameter",
    "/operation/Details/Filters/parameter",
];

/// A request filter's display name and id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Queue {
    /// Display name as shown in the SDP UI.
    pub name: String,

    /// Filter id to pass as `filterby`.
    pub id: String,
}

/// Finds the ids of the named filters in a generic-mode filter response.
///
/// Results follow the order of `names`; a name matching several filters
/// yields one entry per match and an unknown name yields none.
pub fn queues_from_filters(filters: &Value, names: &[&str]) -> Result<Vec<Queue>, SdpError> {
    let Some(raw) = FILTER_PATHS.iter().find_map(|p| filters.pointer(p)) else {
        return Ok(Vec::new());
    };
    let params = OneOrMany::<Parameter>::deserialize(raw)?.into_vec();

    let mut queues = Vec::new();
    for name in names {
        for param in &params {
            if param.value.as_deref() != Some(*name) {
                continue;
            }
            if let Some(id) = &param.name {
                queues.push(Queue {
                    name: name.to_string(),
                    id: id.clone(),
                });
            }
        }
    }
    Ok(queues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn filters() -> Value {
        json!({"operation": {"Details": {"Filters": {"parameter": [
            {"name": "All_Requests", "value": "All Requests"},
            {"name": "Open_System", "value": "Open Requests"},
            {"name": "17", "value": "Back Office"}
        ]}}}})
    }

    #[test]
    fn test_queues_follow_requested_order() {
        let queues = queues_from_filters(&filters(), &["Back Office", "Open Requests"]).unwrap();
        assert_eq!(
            queues,
            vec![
                Queue {
                    name: "Back Office".to_string(),
                    id: "17".to_string()
                },
                Queue {
                    name: "Open Requests".to_string(),
                    id: "Open_System".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_unknown_queue_is_skipped() {
        let queues = queues_from_filters(&filters(), &["Nowhere"]).unwrap();
        assert!(queues.is_empty());
    }

    #[test]
    fn test_api_prefixed_single_filter() {
        let response = json!({"API": {"response": {"operation": {"Details": {"Filters":
            {"parameter": {"name": "5", "value": "Desk"}}
        }}}}});
        let queues = queues_from_filters(&response, &["Desk"]).unwrap();
        assert_eq!(queues.len(), 1);
        assert_eq!(queues[0].id, "5");
    }

    #[test]
    fn test_missing_filters_is_empty() {
        assert!(queues_from_filters(&json!({}), &["Desk"]).unwrap().is_empty());
    }
}
