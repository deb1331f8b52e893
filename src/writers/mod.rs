pub mod tsv_writer;

pub use tsv_writer::{TsvLayout, TsvWriter};
