pub mod aggregation;
pub mod message;
pub mod point;

pub use aggregation::{AggLoc, AggPolicy, AggTime, QueryOptions};
pub use message::{Message, MessageType, WeatherRecord};
pub use point::{BoundingBox, Point, PointSet};
