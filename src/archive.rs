//! Archive domain: item model, identity keys, merge policy and persistence.
//!
//! The archive is a newest-first, length-capped sequence of items in which no
//! two items share an identity key.

pub mod item;
pub mod key;
pub mod merge;
pub mod store;

pub use item::{ArchiveEntry, FailedSubject, GenerationOutcome, Item};
pub use key::derive_key;
pub use merge::{merge_and_persist, merge_outcomes, MergeResult};
pub use store::{ArchiveStore, JsonArchiveStore, MemoryArchiveStore};
