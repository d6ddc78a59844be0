//! Tattle: bounded-concurrency feed generation
//!
//! Generates one short, playful news item per subject through a text
//! provider, attaches images under a run-wide policy, and merges the results
//! into a deduplicated, length-capped JSON archive.

pub mod archive;
pub mod cli;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod generation;
pub mod logging;
pub mod pipeline;
pub mod provider;
