pub mod enriched;
pub mod observation;
pub mod satellite;
pub mod schema;

pub use enriched::{EnrichedObservation, EnrichedObservationBuilder};
pub use observation::RawObservation;
pub use satellite::Satellite;
