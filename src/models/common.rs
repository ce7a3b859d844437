//! Common types shared across SDP response models.
//!
//! This module defines the direct-mode operation result and the
//! building blocks used to reshape generic response trees.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The `status` value SDP reports for a successful operation.
pub const STATUS_SUCCESS: &str = "Success";

/// Result of an operation parsed in direct mode.
///
/// SDP reports the outcome of most operations as
/// `<result><status/><message/></result>` followed by one or more
/// `Details` blocks of `parameter` name/value pairs. A failed operation is
/// data, not an error: check [`is_success`](Self::is_success).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OperationResult {
    /// The `result/status` text, e.g. `Success` or `Failed`.
    pub status: String,

    /// The `result/message` text.
    pub message: Option<String>,

    /// Flattened `Details/parameter` pairs (only filled on success).
    pub parameters: BTreeMap<String, Option<String>>,
}

impl OperationResult {
    /// Returns true if SDP reported `Success`.
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Returns the value of a flattened parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).and_then(|v| v.as_deref())
    }

    /// Returns the message or an empty string.
    pub fn display_message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }

    /// Flattens the result into a single map with `response_status` and
    /// `response_message` keys alongside the parameters.
    ///
    /// A parameter that happens to be named `response_status` or
    /// `response_message` wins over the result block.
    pub fn to_map(&self) -> BTreeMap<String, Option<String>> {
        let mut map = BTreeMap::new();
        map.insert("response_status".to_string(), Some(self.status.clone()));
        map.insert("response_message".to_string(), self.message.clone());
        map.extend(self.parameters.clone());
        map
    }
}

/// A value the generic XML conversion may render as one object or as an
/// array of objects, depending on how many elements the server sent.
///
/// The array form is tried first.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// Two or more elements.
    Many(Vec<T>),
    /// Exactly one element.
    One(T),
}

impl<T> OneOrMany<T> {
    /// Normalizes both forms into a vector, preserving order.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// A `parameter` element after generic conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Parameter {
    /// The `name` child.
    #[serde(default)]
    pub name: Option<String>,

    /// The `value` child; `None` for an empty element.
    #[serde(default)]
    pub value: Option<String>,
}
