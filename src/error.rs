use thiserror::Error;

pub type Result<T> = std::result::Result<T, WeatherError>;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Invalid query: {0}")]
    Validation(String),

    #[error("Field validation error: {0}")]
    FieldValidation(#[from] validator::ValidationErrors),

    #[error("Length mismatch in {context}: expected {expected} values, found {found}")]
    LengthMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid coordinate format: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Could not infer the file format of '{0}'")]
    UnknownFormat(String),

    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] config::ConfigError),
}

impl WeatherError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        WeatherError::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WeatherError::Validation(_) | WeatherError::FieldValidation(_)
        )
    }
}
