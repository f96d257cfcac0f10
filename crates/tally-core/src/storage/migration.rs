//! Versioned schema migrations
//!
//! Each migration is a pure function over raw token rows: records encoded
//! under schema version `from` in, records under `from + 1` out. The store
//! runs the chain in ascending order during `load`, starting from the version
//! recorded in the file header, before any record is decoded. Files already
//! at the current version are never re-transformed.

use tracing::info;

use super::error::MigrationError;

/// One record as unescaped tokens, before typed decoding
pub type RawRecord = Vec<String>;

/// A single version step for one entity type
#[derive(Clone, Copy)]
pub struct Migration {
    /// Version this step upgrades from; its output is `from + 1`
    pub from: u32,
    pub run: fn(Vec<RawRecord>) -> Result<Vec<RawRecord>, MigrationError>,
}

/// Apply every step from `version` up to `target`
///
/// Returns the upgraded rows and whether any step actually ran. A missing
/// step, or a file newer than the running code, is a [`MigrationError::NoPath`].
pub(crate) fn run_chain(
    mut records: Vec<RawRecord>,
    mut version: u32,
    target: u32,
    migrations: &[Migration],
) -> Result<(Vec<RawRecord>, bool), MigrationError> {
    if version > target {
        return Err(MigrationError::NoPath {
            found: version,
            expected: target,
        });
    }

    let migrated = version < target;

    while version < target {
        let step = migrations
            .iter()
            .find(|m| m.from == version)
            .ok_or(MigrationError::NoPath {
                found: version,
                expected: target,
            })?;

        info!("migrating {} records from version {} to {}", records.len(), version, version + 1);
        records = (step.run)(records)?;
        version += 1;
    }

    Ok((records, migrated))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn append_empty(records: Vec<RawRecord>) -> Result<Vec<RawRecord>, MigrationError> {
        Ok(records
            .into_iter()
            .map(|mut record| {
                record.push(String::new());
                record
            })
            .collect())
    }

    fn always_fails(_records: Vec<RawRecord>) -> Result<Vec<RawRecord>, MigrationError> {
        Err(MigrationError::Step {
            from: 2,
            reason: "unmappable state".to_string(),
        })
    }

    const STEPS: &[Migration] = &[
        Migration { from: 1, run: append_empty },
        Migration { from: 2, run: append_empty },
    ];

    #[test]
    fn test_chain_runs_in_order() {
        let rows = vec![vec!["1".to_string()]];
        let (rows, migrated) = run_chain(rows, 1, 3, STEPS).unwrap();

        assert!(migrated);
        assert_eq!(rows, vec![vec!["1".to_string(), String::new(), String::new()]]);
    }

    #[test]
    fn test_current_version_untouched() {
        let rows = vec![vec!["1".to_string()]];
        let (rows, migrated) = run_chain(rows.clone(), 3, 3, STEPS).unwrap();

        assert!(!migrated);
        assert_eq!(rows, vec![vec!["1".to_string()]]);
    }

    #[test]
    fn test_missing_step_is_no_path() {
        let err = run_chain(vec![], 0, 3, STEPS).unwrap_err();
        assert_eq!(err, MigrationError::NoPath { found: 0, expected: 3 });
    }

    #[test]
    fn test_newer_file_is_no_path() {
        let err = run_chain(vec![], 5, 3, STEPS).unwrap_err();
        assert_eq!(err, MigrationError::NoPath { found: 5, expected: 3 });
    }

    #[test]
    fn test_failing_step_aborts() {
        let steps = &[
            Migration { from: 1, run: append_empty },
            Migration { from: 2, run: always_fails },
        ];

        let err = run_chain(vec![vec!["1".to_string()]], 1, 3, steps).unwrap_err();
        assert_eq!(
            err,
            MigrationError::Step {
                from: 2,
                reason: "unmappable state".to_string(),
            }
        );
    }
}
