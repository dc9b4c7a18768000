//! Schema upgrades for stored databases.
//!
//! Records are gated on the major component of their `version` field. Major
//! 1 is current and keeps its version; major 0 (and records with no version
//! at all) is rewritten as [`SCHEMA_VERSION`]. Either way the subscriptions
//! are repaired on load: keywords re-sorted, invalid threads dropped, threads
//! re-sorted, `latest` recomputed and missing or duplicate sids regenerated.

use serde_json::Value;
use std::collections::HashSet;
use tracing::{info, warn};

use super::store::{DatabaseRecord, StoreError, SCHEMA_VERSION};
use crate::subscription::Subscription;

const CURRENT_MAJOR: u64 = 1;

/// Bring a stored JSON document up to [`SCHEMA_VERSION`].
pub fn upgrade(value: Value) -> Result<DatabaseRecord, StoreError> {
    let version = value
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_string);

    let major = match &version {
        None => 0,
        Some(v) => major_of(v).ok_or_else(|| StoreError::UnsupportedVersion(v.clone()))?,
    };

    match major {
        CURRENT_MAJOR => load_current(value),
        0 => upgrade_legacy(value, version.as_deref().unwrap_or("none")),
        _ => Err(StoreError::UnsupportedVersion(version.unwrap_or_default())),
    }
}

fn major_of(version: &str) -> Option<u64> {
    version.trim_start_matches('v').split('.').next()?.parse().ok()
}

/// Subscriptions after the invariants were re-established.
struct Repaired {
    subscriptions: Vec<Subscription>,
    dropped_threads: usize,
    regenerated_sids: usize,
}

impl Repaired {
    fn changed(&self) -> bool {
        self.dropped_threads > 0 || self.regenerated_sids > 0
    }
}

/// Re-sort, drop invalid threads and make sids present and unique.
///
/// Sorting and `latest` are recomputed silently. The first holder of a sid
/// keeps it, later holders get a fresh one.
fn repair(subscriptions: Vec<Subscription>) -> Result<Repaired, StoreError> {
    let mut dropped_threads = 0;
    let mut subscriptions: Vec<Subscription> = subscriptions
        .into_iter()
        .map(|mut sub| {
            dropped_threads += sub.normalize();
            sub
        })
        .collect();

    let mut taken: HashSet<String> = HashSet::new();
    let mut needs_sid = Vec::new();
    for (i, sub) in subscriptions.iter_mut().enumerate() {
        match sub.sid().map(str::to_string) {
            Some(sid) if !sid.is_empty() && !taken.contains(&sid) => {
                taken.insert(sid);
            }
            _ => {
                sub.clear_sid();
                needs_sid.push(i);
            }
        }
    }
    for &i in &needs_sid {
        let sid = subscriptions[i].generate_sid(&taken)?.to_string();
        taken.insert(sid);
    }

    Ok(Repaired {
        subscriptions,
        dropped_threads,
        regenerated_sids: needs_sid.len(),
    })
}

fn load_current(value: Value) -> Result<DatabaseRecord, StoreError> {
    let record: DatabaseRecord =
        serde_json::from_value(value).map_err(|e| StoreError::Corrupt(e.to_string()))?;

    let repaired = repair(record.subscriptions)?;
    if repaired.changed() {
        warn!(
            version = %record.version,
            dropped_threads = repaired.dropped_threads,
            regenerated_sids = repaired.regenerated_sids,
            "Repaired stored database"
        );
    }

    Ok(DatabaseRecord {
        version: record.version,
        subscriptions: repaired.subscriptions,
    })
}

fn upgrade_legacy(value: Value, from: &str) -> Result<DatabaseRecord, StoreError> {
    let subscriptions = match value.get("subscriptions") {
        Some(subs) => serde_json::from_value::<Vec<Subscription>>(subs.clone())
            .map_err(|e| StoreError::Corrupt(e.to_string()))?,
        None => Vec::new(),
    };

    let repaired = repair(subscriptions)?;
    info!(
        from = from,
        to = SCHEMA_VERSION,
        subscriptions = repaired.subscriptions.len(),
        dropped_threads = repaired.dropped_threads,
        regenerated_sids = repaired.regenerated_sids,
        "Upgraded stored database"
    );

    Ok(DatabaseRecord {
        version: SCHEMA_VERSION.to_string(),
        subscriptions: repaired.subscriptions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_current_version_loads_as_is() {
        let value = json!({
            "version": "1.0.0",
            "subscriptions": [{
                "name": "Show",
                "keywords": ["kw"],
                "sid": "abcd1234",
                "threads": [{"title": "E1", "link": "l1", "ep": [1]}],
                "latest": 1
            }]
        });

        let record = upgrade(value).unwrap();

        assert_eq!(record.version, "1.0.0");
        assert_eq!(record.subscriptions[0].sid(), Some("abcd1234"));
        assert_eq!(record.subscriptions[0].latest(), 1.0);
    }

    #[test]
    fn test_current_version_is_repaired() {
        let value = json!({
            "version": "1.0.0",
            "subscriptions": [
                {
                    "name": "Show",
                    "keywords": ["kw"],
                    "sid": "abcd1234",
                    "threads": [
                        {"title": "E1", "link": "l1", "ep": [1]},
                        {"title": "E3", "link": "l3", "ep": [3]},
                        {"title": "Bad", "link": "", "ep": [2]}
                    ],
                    "latest": 1
                },
                {
                    "name": "Other",
                    "keywords": ["kw"],
                    "sid": "abcd1234",
                    "threads": [],
                    "latest": -1
                }
            ]
        });

        let record = upgrade(value).unwrap();

        assert_eq!(record.version, "1.0.0");
        let show = &record.subscriptions[0];
        assert_eq!(show.sid(), Some("abcd1234"));
        assert_eq!(show.threads().len(), 2);
        assert_eq!(show.threads()[0].title, "E3");
        assert_eq!(show.latest(), 3.0);

        let other = record.subscriptions[1].sid().unwrap();
        assert_ne!(other, "abcd1234");
        assert_eq!(other.len(), 8);
    }

    #[test]
    fn test_minor_versions_share_the_schema() {
        let value = json!({"version": "1.4.2", "subscriptions": []});
        assert!(upgrade(value).is_ok());
    }

    #[test]
    fn test_newer_major_is_rejected() {
        let value = json!({"version": "2.0.0", "subscriptions": []});
        let result = upgrade(value);
        assert!(matches!(result, Err(StoreError::UnsupportedVersion(v)) if v == "2.0.0"));
    }

    #[test]
    fn test_garbage_version_is_rejected() {
        let value = json!({"version": "latest", "subscriptions": []});
        assert!(matches!(
            upgrade(value),
            Err(StoreError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_legacy_record_is_repaired() {
        let value = json!({
            "version": "0.3.1",
            "subscriptions": [
                {
                    "name": "Show",
                    "keywords": ["z", "a"],
                    "sid": "dup",
                    "threads": [
                        {"title": "E1", "link": "l1", "ep": [1]},
                        {"title": "E3", "link": "", "ep": [3]},
                        {"title": "E2", "link": "l2", "ep": [2]}
                    ],
                    "latest": 0
                },
                {
                    "name": "Other",
                    "keywords": ["kw"],
                    "sid": "dup",
                    "threads": []
                },
                {
                    "name": "NoSid",
                    "keywords": []
                }
            ]
        });

        let record = upgrade(value).unwrap();

        assert_eq!(record.version, SCHEMA_VERSION);
        let show = &record.subscriptions[0];
        assert_eq!(show.keywords(), &["a".to_string(), "z".to_string()]);
        assert_eq!(show.threads().len(), 2);
        assert_eq!(show.threads()[0].title, "E2");
        assert_eq!(show.latest(), 2.0);
        assert_eq!(show.sid(), Some("dup"));

        let sids: HashSet<&str> = record
            .subscriptions
            .iter()
            .map(|s| s.sid().unwrap())
            .collect();
        assert_eq!(sids.len(), 3);
        assert_eq!(record.subscriptions[2].latest(), -1.0);
    }

    #[test]
    fn test_missing_version_is_legacy() {
        let value = json!({
            "subscriptions": [{"name": "Show", "keywords": ["kw"]}]
        });

        let record = upgrade(value).unwrap();

        assert_eq!(record.version, SCHEMA_VERSION);
        assert!(record.subscriptions[0].sid().is_some());
    }
}
