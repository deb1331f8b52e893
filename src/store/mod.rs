pub mod extractor;

pub use extractor::{StoreState, WeatherExtractor};
