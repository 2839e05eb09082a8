//! Property tests for locale resolution.
//!
//! 1. Resolution of a non-empty all-string map never fails.
//! 2. The result is always one of the map's values.
//! 3. An exact key match always wins.
//! 4. A locale sharing no language with any key gets the first entry.

use proptest::prelude::*;
use waypoint_i18n::{LocaleMap, resolve_localized};

fn tag() -> impl Strategy<Value = String> {
    "[a-z]{2}-[A-Z]{2}"
}

fn string_map() -> impl Strategy<Value = LocaleMap> {
    proptest::collection::vec((tag(), "[a-zA-Z ]{0,12}"), 1..6)
        .prop_map(|entries| entries.into_iter().collect())
}

proptest! {
    #[test]
    fn resolution_is_total_on_string_maps(map in string_map(), locale in tag()) {
        prop_assert!(resolve_localized(&map, &locale).is_ok());
    }

    #[test]
    fn result_comes_from_the_map(map in string_map(), locale in tag()) {
        let text = resolve_localized(&map, &locale).unwrap();
        prop_assert!(map.iter().any(|(_, v)| v.as_str() == Some(text.as_str())));
    }

    #[test]
    fn exact_key_wins(map in string_map(), pick in any::<prop::sample::Index>()) {
        let entries: Vec<(String, String)> = map
            .iter()
            .map(|(k, v)| (k.to_string(), v.as_str().unwrap_or_default().to_string()))
            .collect();
        let (key, value) = &entries[pick.index(entries.len())];
        prop_assert_eq!(&resolve_localized(&map, key).unwrap(), value);
    }

    #[test]
    fn unrelated_locale_gets_first_entry(map in string_map()) {
        // Keys are lowercase ASCII letters; digits never share a prefix.
        let first = map.iter().next().and_then(|(_, v)| v.as_str()).unwrap().to_string();
        prop_assert_eq!(resolve_localized(&map, "00-00").unwrap(), first);
    }
}
