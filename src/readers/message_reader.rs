use crate::error::{Result, WeatherError};
use crate::models::Message;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Reads decoded message batches stored as JSON lines, one message per line.
pub struct MessageReader {
    validate: bool,
}

impl MessageReader {
    pub fn new() -> Self {
        Self { validate: true }
    }

    pub fn with_validation(validate: bool) -> Self {
        Self { validate }
    }

    pub fn read_messages(&self, path: &Path) -> Result<Vec<Message>> {
        let file = File::open(path)?;
        let messages = self.read_from(BufReader::new(file))?;
        debug!("Read {} messages from {}", messages.len(), path.display());
        Ok(messages)
    }

    pub fn read_from<R: BufRead>(&self, reader: R) -> Result<Vec<Message>> {
        let mut messages = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let message: Message = serde_json::from_str(&line).map_err(|e| {
                WeatherError::InvalidFormat(format!("line {}: {}", index + 1, e))
            })?;

            if self.validate {
                message.validate_shape()?;
            }
            messages.push(message);
        }

        Ok(messages)
    }
}

impl Default for MessageReader {
    fn default() -> Self {
        Self::new()
    }
}
