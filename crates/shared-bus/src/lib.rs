//! # Shared Bus - Commitment Event Channel
//!
//! Carries [`CommitmentEvent`]s from the admission subsystem (hc-01) to the
//! commitment index (hc-02).
//!
//! ## Channel Shape
//!
//! ```text
//! ┌──────────────┐   publish()    ┌──────────────┐   recv()    ┌──────────────┐
//! │  Admission   │ ─────────────→ │ bounded mpsc │ ──────────→ │ Index handler│
//! │  (hc-01)     │  BusMessage    │   channel    │             │ (node-runtime)│
//! └──────────────┘                └──────────────┘             └──────────────┘
//! ```
//!
//! The channel is point-to-point: every event has exactly one consumer, and
//! the sequence number on each [`BusMessage`] makes delivery order visible in
//! logs and tests. A publisher that needs the outcome uses
//! [`EventPublisher::request`]; the consumer answers on the message's reply
//! channel. A full channel applies backpressure to the publisher
//! instead of dropping events.
//!
//! [`CommitmentEvent`]: shared_types::CommitmentEvent

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{BusMessage, Delivery};
pub use publisher::{channel, BusError, ChannelPublisher, EventPublisher};
pub use subscriber::EventStream;

/// Maximum events to buffer before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
