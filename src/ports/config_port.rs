//! Configuration access port trait.

use crate::domain::error::PriceStoreError;

/// Section/key lookups over the host configuration.
///
/// Only `get_string` is required. The typed getters return `Ok(None)` for an
/// unset key and `ConfigInvalid` for a value of the wrong shape, so a typo in
/// the file never silently turns into a default.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, PriceStoreError> {
        self.get_string(section, key)
            .map(|value| {
                value
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| invalid(section, key, format!("'{value}' is not an integer: {e}")))
            })
            .transpose()
    }

    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, PriceStoreError> {
        self.get_string(section, key)
            .map(|value| {
                parse_bool(&value)
                    .ok_or_else(|| invalid(section, key, format!("'{value}' is not a boolean")))
            })
            .transpose()
    }
}

/// Accepts `true/yes/1/on` and `false/no/0/off`, any case.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(section: &str, key: &str, reason: String) -> PriceStoreError {
    PriceStoreError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapConfig(HashMap<(&'static str, &'static str), &'static str>);

    impl ConfigPort for MapConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.0
                .iter()
                .find(|((s, k), _)| *s == section && *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    fn config(entries: &[(&'static str, &'static str, &'static str)]) -> MapConfig {
        MapConfig(entries.iter().map(|(s, k, v)| ((*s, *k), *v)).collect())
    }

    #[test]
    fn typed_getters_report_unset_as_none() {
        let cfg = config(&[]);
        assert_eq!(cfg.get_int("sqlite", "pool_size").unwrap(), None);
        assert_eq!(cfg.get_bool("loader", "load_csv").unwrap(), None);
    }

    #[test]
    fn get_int_parses_with_whitespace() {
        let cfg = config(&[("sqlite", "pool_size", " 8 ")]);
        assert_eq!(cfg.get_int("sqlite", "pool_size").unwrap(), Some(8));
    }

    #[test]
    fn get_int_rejects_garbage() {
        let cfg = config(&[("sqlite", "pool_size", "eight")]);
        match cfg.get_int("sqlite", "pool_size") {
            Err(PriceStoreError::ConfigInvalid { section, key, .. }) => {
                assert_eq!(section, "sqlite");
                assert_eq!(key, "pool_size");
            }
            other => panic!("expected ConfigInvalid, got: {other:?}"),
        }
    }

    #[test]
    fn get_bool_accepts_known_spellings() {
        let cfg = config(&[
            ("loader", "a", "TRUE"),
            ("loader", "b", "on"),
            ("loader", "c", "0"),
            ("loader", "d", "No"),
        ]);
        assert_eq!(cfg.get_bool("loader", "a").unwrap(), Some(true));
        assert_eq!(cfg.get_bool("loader", "b").unwrap(), Some(true));
        assert_eq!(cfg.get_bool("loader", "c").unwrap(), Some(false));
        assert_eq!(cfg.get_bool("loader", "d").unwrap(), Some(false));
    }

    #[test]
    fn get_bool_rejects_garbage() {
        let cfg = config(&[("loader", "load_csv", "maybe")]);
        assert!(matches!(
            cfg.get_bool("loader", "load_csv"),
            Err(PriceStoreError::ConfigInvalid { .. })
        ));
    }
}
