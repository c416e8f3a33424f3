//! Test helpers shared across JTBD crates.

pub mod embedding;
pub mod logging;
pub mod store;

pub use embedding::{FailingEmbedder, FixedEmbedder};
pub use logging::RecordingSink;
pub use store::InMemoryJobStore;
