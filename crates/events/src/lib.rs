//! Cache event bus.
//!
//! - [`CacheEventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`CacheEvent`]: the envelope published when a mutation settles or
//!   a slice of the cache is invalidated.

pub mod bus;

pub use bus::{CacheEvent, CacheEventBus};
