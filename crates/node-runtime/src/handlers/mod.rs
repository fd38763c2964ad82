//! # Event Handlers
//!
//! Tasks that consume the event channel.

pub mod index_events;

pub use index_events::{HandlerStats, HandlerStatsSnapshot, IndexEventHandler};
