//! Query cache and optimistic mutation layer.
//!
//! Writes go through [`MutationController`], which applies the expected
//! result to every affected [`CacheKey`] before the remote call, rolls the
//! cache back if the call fails, and invalidates on settle so the
//! [`Refetcher`] can replace optimistic content with server data.
//!
//! Reads go through [`QueryService`], which serves fresh entries from the
//! [`QueryCache`] and fetches from the [`RemoteStore`] otherwise.

pub mod config;
pub mod error;
pub mod gc;
pub mod key;
pub mod mutation;
pub mod optimistic;
pub mod phase;
pub mod plan;
pub mod query;
pub mod refetch;
pub mod source;
pub mod status;
pub mod store;
pub mod temp_id;

pub use config::CacheConfig;
pub use error::{MutationError, StoreError};
pub use gc::start_gc_sweeper;
pub use key::{CacheKey, CacheValue};
pub use mutation::MutationController;
pub use query::QueryService;
pub use refetch::Refetcher;
pub use source::{PgStore, RemoteStore};
pub use status::{MutationKind, MutationState, MutationStatus};
pub use store::{CacheSnapshot, QueryCache};
pub use temp_id::{NegativeCounter, TempIdGenerator};
