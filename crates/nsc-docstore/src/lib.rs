//! NoSQL Console document store
//!
//! The [`DocumentAdapter`] over MongoDB, Redis and in-memory backends, plus
//! the in-process filter, update, projection and pipeline evaluators the
//! non-MongoDB backends share.

pub mod adapter;
pub mod backends;
pub mod matcher;
pub mod pipeline;
pub mod projection;
pub mod store;
pub mod update;

pub use adapter::DocumentAdapter;
pub use backends::connect;
pub use store::DocumentStore;
