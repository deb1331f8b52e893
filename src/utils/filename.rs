use chrono::{Datelike, Local};
use std::path::PathBuf;

/// Generate default export filename with format: weather-{kind}-{YYMMDD}.tsv
pub fn generate_default_export_filename(kind: &str) -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100;

    let filename = format!(
        "weather-{}-{:02}{:02}{:02}.tsv",
        kind,
        year,
        now.month(),
        now.day()
    );
    PathBuf::from("output").join(filename)
}
