pub mod filename;

pub use filename::{normalize_name, parse, DistFilename};
