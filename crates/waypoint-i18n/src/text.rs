//! Locale-keyed text with a deterministic fallback policy.
//!
//! # Resolution policy
//!
//! For a requested locale such as `"fr-CA"`:
//!
//! 1. An entry whose key equals the locale exactly.
//! 2. Otherwise the first entry (in document order) whose two-letter
//!    language prefix matches (`"fr-FR"`).
//! 3. Otherwise the first entry of the map.
//!
//! # Invariants
//!
//! 1. **Order preserving**: [`LocaleMap`] keeps entries in the order they
//!    were written, so step 2 and 3 are deterministic.
//! 2. **Total on non-empty maps**: resolution always selects an entry; it
//!    only fails when that entry is not a string.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Empty map | `{}` in the tour definition | [`I18nError::EmptyMap`] |
//! | Non-string value | e.g. `{"en-EN": 42}` | [`I18nError::NotAString`] |
//! | Either, `Substitute` policy | | Logged, `"Error"` displayed |

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Locale identifier (e.g., `"en-EN"`, `"fr-CA"`, `"ru"`).
pub type Locale = String;

/// Text shown in place of an entry that failed to resolve.
pub const SUBSTITUTE_TEXT: &str = "Error";

/// Errors from text resolution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum I18nError {
    /// The locale map has no entries at all.
    #[error("locale map is empty")]
    EmptyMap,
    /// The selected entry holds something other than a string.
    #[error("entry '{key}' resolved to non-string value {value}")]
    NotAString { key: String, value: Value },
}

/// Two-letter language prefix of a locale tag, if it has one.
#[must_use]
pub fn language_prefix(locale: &str) -> Option<&str> {
    locale.get(..2)
}

/// Text values keyed by locale tag, in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocaleMap {
    entries: Vec<(Locale, Value)>,
}

impl LocaleMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. A repeated key replaces the earlier value in place.
    pub fn insert(&mut self, locale: impl Into<String>, value: impl Into<Value>) {
        let locale = locale.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == locale) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((locale, value)),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, locale: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(locale, value);
        self
    }

    /// Look up an entry by exact key.
    #[must_use]
    pub fn get(&self, locale: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == locale)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Select the entry for `locale` according to the resolution policy.
    fn select(&self, locale: &str) -> Option<(&str, &Value)> {
        if let Some(exact) = self.iter().find(|(key, _)| *key == locale) {
            return Some(exact);
        }
        if let Some(prefix) = language_prefix(locale) {
            let related = self.iter().find(|(key, _)| {
                language_prefix(key).is_some_and(|p| p.eq_ignore_ascii_case(prefix))
            });
            if related.is_some() {
                return related;
            }
        }
        self.iter().next()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for LocaleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = LocaleMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl Serialize for LocaleMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LocaleMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LocaleMapVisitor;

        impl<'de> Visitor<'de> for LocaleMapVisitor {
            type Value = LocaleMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of locale tags to text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<LocaleMap, A::Error> {
                let mut map = LocaleMap::new();
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(LocaleMapVisitor)
    }
}

/// Resolve a locale map against `locale`.
pub fn resolve_localized(map: &LocaleMap, locale: &str) -> Result<String, I18nError> {
    let (key, value) = map.select(locale).ok_or(I18nError::EmptyMap)?;
    match value {
        Value::String(text) => Ok(text.clone()),
        other => Err(I18nError::NotAString {
            key: key.to_string(),
            value: other.clone(),
        }),
    }
}

/// Display text as written in a tour definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextSource {
    /// Used verbatim for every locale.
    Plain(String),
    /// Resolved per locale.
    Localized(LocaleMap),
}

impl From<&str> for TextSource {
    fn from(text: &str) -> Self {
        TextSource::Plain(text.to_string())
    }
}

impl From<String> for TextSource {
    fn from(text: String) -> Self {
        TextSource::Plain(text)
    }
}

impl From<LocaleMap> for TextSource {
    fn from(map: LocaleMap) -> Self {
        TextSource::Localized(map)
    }
}

/// What to do when a text entry cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocalizationFailure {
    /// Log the error and show [`SUBSTITUTE_TEXT`].
    #[default]
    Substitute,
    /// Return the error to the caller.
    FailFast,
}

/// Resolves [`TextSource`] values for one locale under one failure policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Localizer {
    locale: Locale,
    on_failure: LocalizationFailure,
}

impl Localizer {
    /// Create a localizer for `locale` with the substituting policy.
    #[must_use]
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            on_failure: LocalizationFailure::default(),
        }
    }

    /// Set the failure policy.
    #[must_use]
    pub fn on_failure(mut self, policy: LocalizationFailure) -> Self {
        self.on_failure = policy;
        self
    }

    /// The locale this localizer resolves against.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// The active failure policy.
    #[must_use]
    pub fn failure_policy(&self) -> LocalizationFailure {
        self.on_failure
    }

    /// Resolve a text source, applying the failure policy.
    pub fn resolve(&self, source: &TextSource) -> Result<String, I18nError> {
        let map = match source {
            TextSource::Plain(text) => return Ok(text.clone()),
            TextSource::Localized(map) => map,
        };
        match resolve_localized(map, &self.locale) {
            Ok(text) => Ok(text),
            Err(err) => match self.on_failure {
                LocalizationFailure::FailFast => Err(err),
                LocalizationFailure::Substitute => {
                    tracing::error!(
                        locale = %self.locale,
                        error = %err,
                        "tour configuration error"
                    );
                    Ok(SUBSTITUTE_TEXT.to_string())
                }
            },
        }
    }
}
