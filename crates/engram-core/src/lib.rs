//! # engram-core
//!
//! Foundation crate for the Engram retrieval engine.
//! Defines the entity model, query model, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod entity;
pub mod errors;
pub mod outcome;
pub mod query;
pub mod stats;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::EngramConfig;
pub use entity::{Entity, EntityDraft, EntityPatch, Metadata};
pub use errors::{EngramError, EngramResult};
pub use outcome::{BulkOutcome, MutationOutcome, ReadOutcome, Source, Strategy};
pub use query::{DateRange, QueryInput, QueryOptions, ResponseStyle};
