//! Data models
//!
//! Rust structs representing database entities.

mod profile;
mod weight;

pub use profile::{ProfileUpsert, StoredProfile};
pub use weight::{WeightSample, WeightSampleCreate, WeightTrend};
