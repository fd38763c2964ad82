//! # Shared Types Crate
//!
//! Entities and event variants exchanged between the admission subsystem
//! (hc-01), the commitment index (hc-02) and the node runtime.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the commitment record shape is defined here
//!   and nowhere else.
//! - **Closed Events**: everything that crosses a subsystem boundary is one of
//!   the tagged variants in [`events`], so every dispatch is exhaustive.

pub mod clock;
pub mod entities;
pub mod errors;
pub mod events;

pub use clock::{FixedTimeSource, SystemTimeSource, TimeSource};
pub use entities::*;
pub use errors::*;
pub use events::{Applied, CommitmentEvent, LedgerEvent};
