use crate::error::Result;
use crate::models::Message;
use crate::utils::constants::SNAPSHOT_SUFFIX;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Path with the snapshot suffix appended unless it already ends with it.
pub fn snapshot_path(path: &Path) -> PathBuf {
    let name = path.to_string_lossy();
    if name.ends_with(SNAPSHOT_SUFFIX) {
        path.to_path_buf()
    } else {
        PathBuf::from(format!("{}{}", name, SNAPSHOT_SUFFIX))
    }
}

/// Write the full message set so it can be reloaded without re-deriving parameters.
pub fn write_snapshot(messages: &[Message], path: &Path) -> Result<PathBuf> {
    let path = snapshot_path(path);
    info!("Saving {} messages to {}", messages.len(), path.display());

    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer(&mut writer, messages)?;
    writer.flush()?;

    Ok(path)
}

/// Read a snapshot back, checking every message the same way batch input is checked.
pub fn read_snapshot(path: &Path) -> Result<Vec<Message>> {
    let reader = BufReader::new(File::open(path)?);
    let messages: Vec<Message> = serde_json::from_reader(reader)?;
    for message in &messages {
        message.validate_shape()?;
    }
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WeatherError;
    use crate::models::{MessageType, PointSet};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_snapshot_path() {
        assert_eq!(
            snapshot_path(Path::new("data/may")),
            PathBuf::from("data/may.snapshot.json")
        );
        assert_eq!(
            snapshot_path(Path::new("data/may.snapshot.json")),
            PathBuf::from("data/may.snapshot.json")
        );
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let base = NaiveDate::from_ymd_opt(2018, 5, 10).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let grid = PointSet::new(vec![45.0, 46.0], vec![13.0, 14.0]).unwrap();
        let messages = vec![Message::new("2t", vec![280.5, 281.0], base, base, grid, MessageType::Forecast)];

        let path = write_snapshot(&messages, &temp_dir.path().join("may")).unwrap();
        assert_eq!(read_snapshot(&path).unwrap(), messages);
    }

    #[test]
    fn test_malformed_snapshot_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.snapshot.json");
        std::fs::write(
            &path,
            r#"[{"shortName": "2t", "values": [1.0, 2.0, 3.0],
                 "validDateTime": "2018-05-10T00:00:00", "validityDateTime": "2018-05-10T06:00:00",
                 "lats": [45.0, 45.5, 46.0], "lons": [13.0, 14.0], "type": "fc"}]"#,
        )
        .unwrap();

        let err = read_snapshot(&path).unwrap_err();
        assert!(matches!(err, WeatherError::LengthMismatch { expected: 3, found: 2, .. }));
    }
}
