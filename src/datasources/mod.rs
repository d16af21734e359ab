pub mod advisor;
pub mod nominatim;
pub mod openmeteo;

pub use advisor::AdvisorClient;
pub use nominatim::NominatimClient;
pub use openmeteo::OpenMeteoClient;
