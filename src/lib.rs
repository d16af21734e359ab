//! Sprayability assessment for agricultural treatments.
//!
//! Scores forecast hours against crop, product and wind-sensitivity
//! thresholds, finds continuous operational windows, derives trend metrics
//! and assembles agronomic advice, locally or from a remote advisory service.

pub mod config;
pub mod datasources;
pub mod db;
pub mod error;
pub mod logic;
pub mod models;
pub mod report;
pub mod server;
