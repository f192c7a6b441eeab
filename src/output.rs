use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::audio::features::FeatureRecord;
use crate::error::{ExtractError, Result};

/// Serialize `record` as JSON to `path`.
///
/// The file is written next to its destination and renamed into place, so a
/// failed run never leaves a truncated file behind.
pub fn write_features(record: &FeatureRecord, path: &Path, pretty: bool) -> Result<()> {
    record.validate()?;

    let write_err = |source: std::io::Error| ExtractError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let json = if pretty {
        serde_json::to_vec_pretty(record)?
    } else {
        serde_json::to_vec(record)?
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(&json).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    log::info!("Wrote features to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::features::FeatureSeries;

    fn record() -> FeatureRecord {
        FeatureRecord {
            duration: 1.0,
            sample_rate: 22050,
            rms: FeatureSeries {
                values: vec![0.0, 1.0],
                times: vec![0.0, 0.023219954648526078],
            },
            spectral_centroid: FeatureSeries {
                values: vec![1.0, 0.0],
                times: vec![0.0, 0.023219954648526078],
            },
            onsets: vec![0.0],
        }
    }

    #[test]
    fn test_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.json");
        write_features(&record(), &path, true).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"duration\": 1.0,"));
        let parsed: FeatureRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, record());
    }

    #[test]
    fn test_writes_compact_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.json");
        write_features(&record(), &path, false).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains('\n'));
        assert!(text.starts_with("{\"duration\":1.0,\"sample_rate\":22050,"));
    }

    #[test]
    fn test_invalid_record_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.json");
        let mut bad = record();
        bad.rms.values[0] = f64::NAN;

        assert!(write_features(&bad, &path, true).is_err());
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_directory_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("features.json");

        let err = write_features(&record(), &path, true).unwrap_err();
        assert!(matches!(err, ExtractError::Write { .. }));
        assert!(err.to_string().contains("features.json"), "{}", err);
        assert!(!path.exists());
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.json");
        std::fs::write(&path, "stale").unwrap();

        write_features(&record(), &path, true).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"onsets\""));
    }
}
