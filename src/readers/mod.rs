pub mod message_reader;
pub mod owm_reader;
pub mod snapshot;

pub use message_reader::MessageReader;
pub use owm_reader::OwmReader;
pub use snapshot::{read_snapshot, snapshot_path, write_snapshot};

use crate::error::{Result, WeatherError};
use crate::models::Message;
use crate::utils::constants::{MESSAGES_SUFFIX, OWM_SUFFIX, SNAPSHOT_SUFFIX};
use clap::ValueEnum;
use std::path::Path;

/// On-disk formats the extractor can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LoadFormat {
    /// Decoded message batches, one JSON message per line
    Messages,
    /// OpenWeatherMap forecast response
    Owm,
    /// Previously stored extractor state
    Snapshot,
}

impl LoadFormat {
    /// Infer the format shared by all paths from their file names.
    pub fn infer<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut inferred: Option<LoadFormat> = None;

        for path in paths {
            let path = path.as_ref();
            let name = path.to_string_lossy();
            let format = if name.ends_with(SNAPSHOT_SUFFIX) {
                LoadFormat::Snapshot
            } else if name.ends_with(MESSAGES_SUFFIX) {
                LoadFormat::Messages
            } else if name.ends_with(OWM_SUFFIX) {
                LoadFormat::Owm
            } else {
                return Err(WeatherError::UnknownFormat(name.into_owned()));
            };

            match inferred {
                Some(previous) if previous != format => {
                    return Err(WeatherError::UnknownFormat(format!(
                        "mixed formats ({:?} and {:?})",
                        previous, format
                    )))
                }
                _ => inferred = Some(format),
            }
        }

        inferred.ok_or_else(|| WeatherError::validation("no input files given"))
    }

    /// Whether derived parameters still have to be computed after loading.
    pub fn needs_extension(&self) -> bool {
        matches!(self, LoadFormat::Messages)
    }

    pub fn read(&self, path: &Path) -> Result<Vec<Message>> {
        match self {
            LoadFormat::Messages => MessageReader::new().read_messages(path),
            LoadFormat::Owm => OwmReader::new().read_messages(path),
            LoadFormat::Snapshot => read_snapshot(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_format() {
        assert_eq!(LoadFormat::infer(&["a.jsonl", "b.jsonl"]).unwrap(), LoadFormat::Messages);
        assert_eq!(LoadFormat::infer(&["state.snapshot.json"]).unwrap(), LoadFormat::Snapshot);
        assert_eq!(LoadFormat::infer(&["owm.json"]).unwrap(), LoadFormat::Owm);
        assert!(LoadFormat::infer(&["a.jsonl", "owm.json"]).is_err());
        assert!(LoadFormat::infer(&["data.grib"]).is_err());
        assert!(LoadFormat::infer::<&str>(&[]).is_err());
    }
}
