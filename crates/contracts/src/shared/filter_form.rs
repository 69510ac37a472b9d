use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Filter values keyed by form field name.
///
/// `None` marks a field that is explicitly unset, which the form renders as blank.
/// An empty string is a value, but both the storage and display paths treat it as unset.
/// Equality ignores insertion order.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct FilterMap(IndexMap<String, Option<String>>);

impl FilterMap {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(IndexMap::with_capacity(capacity))
    }

    /// Builds a map where every entry has a value
    pub fn from_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        values
            .into_iter()
            .map(|(key, value)| (key.into(), Some(value.into())))
            .collect()
    }

    /// Value of a field, `None` when the key is missing or unset
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.as_deref())
    }

    /// Raw entry, distinguishes a missing key from an unset one
    pub fn get_entry(&self, key: &str) -> Option<&Option<String>> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Inserts or replaces an entry. A replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) -> Option<Option<String>> {
        self.0.insert(key.into(), value)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), Some(value.into()));
    }

    pub fn unset(&mut self, key: impl Into<String>) {
        self.0.insert(key.into(), None);
    }

    pub fn remove(&mut self, key: &str) -> Option<Option<String>> {
        self.0.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Option<String>)> for FilterMap {
    fn from_iter<T: IntoIterator<Item = (String, Option<String>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FilterMap {
    type Item = (String, Option<String>);
    type IntoIter = indexmap::map::IntoIter<String, Option<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Direction of a normalization pass relative to the persisted token
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Values on their way out of the token, about to be shown in the form
    Inbound,
    /// Values on their way into the token
    Outbound,
}

/// Submit buttons of the filter form
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FilterAction {
    Filter,
    Reset,
}

impl FilterAction {
    /// Name of the submit button that triggers the action
    pub fn button_name(self) -> &'static str {
        match self {
            FilterAction::Filter => "filter",
            FilterAction::Reset => "reset",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterAction::Filter => "Filter",
            FilterAction::Reset => "Reset",
        }
    }

    pub fn from_button_name(name: &str) -> Option<Self> {
        match name {
            "filter" => Some(FilterAction::Filter),
            "reset" => Some(FilterAction::Reset),
            _ => None,
        }
    }
}

/// Current filter state of a listing page
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FilterStateResponse {
    pub token: Option<String>,
    pub data: FilterMap,
}

/// Response to an AJAX submit or reset, the caller patches the page in place
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FilterActionResponse {
    pub action: FilterAction,
    pub token: Option<String>,
    pub data: FilterMap,
    /// Query string that carries the new state, for history updates
    pub query: String,
    /// Freshly rendered filter form
    pub html: String,
}
