pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use coordinates::{dms_to_decimal, nearest, parse_bounding_box, parse_point};
pub use filename::generate_default_export_filename;
pub use progress::ProgressReporter;
