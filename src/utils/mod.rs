pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use coordinates::{haversine_distance, round_coordinate};
pub use filename::{file_extension, generate_default_output_filename};
pub use progress::ProgressReporter;
