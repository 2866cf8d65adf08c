//! The material-supply timeline: per-depot capacity profiles answering
//! earliest-supply queries and committing deliveries.

mod error;
mod timeline;

pub use error::SupplyError;
pub use timeline::SupplyTimeline;
