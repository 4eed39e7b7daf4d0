pub mod observation_reader;

pub use observation_reader::{ObservationReader, REQUIRED_COLUMNS};
