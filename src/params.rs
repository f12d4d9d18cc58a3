//! Ordered request parameters.
//!
//! GitLab takes the same key/value parameters either in the query string or
//! as a form-encoded body, so both placements share this one container.

use serde::{Serialize, Serializer};
use url::form_urlencoded;

use crate::error::{GitlabError, Result};

/// An ordered set of string parameters with replace-on-set semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build parameters from any struct that serializes to a flat map.
    ///
    /// `None` fields are skipped when the struct marks them with
    /// `skip_serializing_if = "Option::is_none"`.
    ///
    /// # Errors
    ///
    /// Returns [`GitlabError::InvalidParameter`] if the value is not a flat
    /// key/value structure.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let encoded = serde_urlencoded::to_string(value)
            .map_err(|e| GitlabError::InvalidParameter(e.to_string()))?;
        Ok(Self {
            pairs: form_urlencoded::parse(encoded.as_bytes())
                .into_owned()
                .collect(),
        })
    }

    /// Set a parameter, replacing any previous value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Set a parameter only when a value is present.
    pub fn set_opt<V: ToString>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.set(key, value);
        }
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Get the value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.pairs.iter().position(|(k, _)| k == key)?;
        Some(self.pairs.remove(index).1)
    }

    /// Copy every pair of `other` into `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: &Params) {
        for (key, value) in &other.pairs {
            self.set(key.clone(), value);
        }
    }

    /// Returns true if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Iterate over key/value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encode as `application/x-www-form-urlencoded`.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.set(key, value);
        }
        params
    }
}

/// Serialize an optional list as one comma-joined value, as GitLab expects
/// for fields such as `labels`.
pub(crate) fn comma_separated<S: Serializer>(
    values: &Option<Vec<String>>,
    serializer: S,
) -> core::result::Result<S::Ok, S::Error> {
    match values {
        Some(values) => serializer.serialize_str(&values.join(",")),
        None => serializer.serialize_none(),
    }
}
