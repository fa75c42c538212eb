//! Shared types used across the dwellspace crates.

mod types;

pub use types::{Color, EntityId, Transform};
