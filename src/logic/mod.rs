pub mod advisory;
pub mod analysis;
pub mod evaluator;
pub mod scoring;
pub mod service;
pub mod trends;
pub mod windows;

pub use advisory::AdvisoryGenerator;
pub use analysis::{analyze, SprayReport};
pub use service::{SeriesFetch, SprayService};
