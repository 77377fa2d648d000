//! Datastore interface for the Deckcast pipeline.
//!
//! This crate provides:
//! - The [`Datastore`] trait the poller and stage handlers are injected with
//! - The [`DatastoreError`] taxonomy shared by all backends
//! - [`MemoryDatastore`], an in-process reference backend for tests,
//!   selfchecks and single-node runs
//!
//! Durable backends (Postgres and friends) live outside this workspace and
//! implement the same trait.

pub mod error;
pub mod memory;
pub mod store;

pub use error::{DatastoreError, DatastoreResult};
pub use memory::MemoryDatastore;
pub use store::Datastore;
