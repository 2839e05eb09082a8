//! Control button labels (`prev`, `next`, `done`, `of`).
//!
//! Tours may supply their own labels; otherwise the built-in English,
//! Russian and French table is used. Labels resolve with the same locale
//! policy as step text.

use crate::text::{I18nError, LocaleMap, Localizer, TextSource};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unresolved button labels, keyed by button name, in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControlButtons {
    entries: Vec<(String, TextSource)>,
}

impl ControlButtons {
    /// Create an empty label set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the label source for `button`.
    #[must_use]
    pub fn with(mut self, button: impl Into<String>, source: impl Into<TextSource>) -> Self {
        let button = button.into();
        let source = source.into();
        match self.entries.iter_mut().find(|(name, _)| *name == button) {
            Some(slot) => slot.1 = source,
            None => self.entries.push((button, source)),
        }
        self
    }

    /// The built-in label table.
    #[must_use]
    pub fn builtin() -> Self {
        let table = |en: &str, ru: &str, fr: &str| {
            LocaleMap::new()
                .with("en-EN", en)
                .with("ru-RU", ru)
                .with("fr-FR", fr)
        };
        Self::new()
            .with("done", table("done", "закр", "fini"))
            .with("prev", table("prev", "пред", "préc"))
            .with("next", table("next", "след", "proch"))
            .with(
                "of",
                LocaleMap::new()
                    .with("en-EN", "of")
                    .with("fr-FR", "de")
                    .with("ru-RU", "из"),
            )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve every label for the localizer's locale.
    pub fn resolve(&self, localizer: &Localizer) -> Result<ControlLabels, I18nError> {
        let entries = self
            .entries
            .iter()
            .map(|(name, source)| Ok((name.clone(), localizer.resolve(source)?)))
            .collect::<Result<Vec<_>, I18nError>>()?;
        Ok(ControlLabels { entries })
    }
}

impl Serialize for ControlButtons {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, source) in &self.entries {
            map.serialize_entry(name, source)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ControlButtons {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ButtonsVisitor;

        impl<'de> Visitor<'de> for ButtonsVisitor {
            type Value = ControlButtons;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of button names to labels")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> Result<ControlButtons, A::Error> {
                let mut buttons = ControlButtons::new();
                while let Some((name, source)) = access.next_entry::<String, TextSource>()? {
                    buttons = buttons.with(name, source);
                }
                Ok(buttons)
            }
        }

        deserializer.deserialize_map(ButtonsVisitor)
    }
}

/// Resolved button labels.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ControlLabels {
    entries: Vec<(String, String)>,
}

impl ControlLabels {
    /// Label for `button`, if the tour defines one.
    #[must_use]
    pub fn get(&self, button: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == button)
            .map(|(_, label)| label.as_str())
    }

    #[must_use]
    pub fn prev(&self) -> Option<&str> {
        self.get("prev")
    }

    #[must_use]
    pub fn next(&self) -> Option<&str> {
        self.get("next")
    }

    #[must_use]
    pub fn done(&self) -> Option<&str> {
        self.get("done")
    }

    #[must_use]
    pub fn of(&self) -> Option<&str> {
        self.get("of")
    }

    /// Iterate over all labels in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, label)| (name.as_str(), label.as_str()))
    }
}
