//! Per-request parameter map
//!
//! Collects values from path segments, the query string, and decoded
//! request bodies. Path and query entries are string-typed; JSON bodies may
//! contribute structured values. A map is created fresh for each request
//! and discarded with the response.

use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Parameters accumulated while dispatching one request
///
/// Sources merge in evaluation order — path segments, then query (read
/// requests) or body (mutating requests) — with later sources overwriting
/// earlier keys of the same name.
///
/// # Examples
///
/// ```
/// use virgule::Params;
///
/// let mut params = Params::new();
/// params.insert("id", "42");
/// assert_eq!(params.get_str("id"), Some("42"));
/// assert_eq!(params.get_as::<i64>("id"), Some(42));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: HashMap<String, JsonValue>,
}

impl Params {
    /// Creates an empty parameter map
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from string key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), JsonValue::String(v.into())))
                .collect(),
        }
    }

    /// Builds a map from the entries of a JSON object
    ///
    /// Non-object values contribute nothing.
    pub fn from_json(json: &JsonValue) -> Self {
        let mut params = Self::new();
        if let JsonValue::Object(map) = json {
            for (key, value) in map {
                params.values.insert(key.clone(), value.clone());
            }
        }
        params
    }

    /// Inserts a string-typed parameter, overwriting any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(key.into(), JsonValue::String(value.into()));
    }

    /// Inserts a structured parameter, overwriting any previous value
    pub fn insert_value(&mut self, key: impl Into<String>, value: JsonValue) {
        self.values.insert(key.into(), value);
    }

    /// Merges another map into this one; the other map's keys win
    pub fn extend(&mut self, other: Params) {
        self.values.extend(other.values);
    }

    /// Gets a parameter as its raw JSON value
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.values.get(key)
    }

    /// Gets a parameter as a string slice, if it is string-typed
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key)?.as_str()
    }

    /// Gets a parameter parsed into a specific type
    ///
    /// String values are parsed directly; other JSON values go through
    /// their display form, so `get_as::<i64>` works for both `"42"` and
    /// `42`.
    pub fn get_as<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        match self.values.get(key)? {
            JsonValue::String(s) => s.parse().ok(),
            other => other.to_string().parse().ok(),
        }
    }

    /// Checks if a parameter exists
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of parameters in the map
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Checks if the map is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get as HashMap
    pub fn as_map(&self) -> &HashMap<String, JsonValue> {
        &self.values
    }
}
