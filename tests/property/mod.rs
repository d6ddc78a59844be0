//! Property-based tests for ordering, deduplication and quota guarantees

mod image_quota;
mod key_properties;
mod runner_properties;
