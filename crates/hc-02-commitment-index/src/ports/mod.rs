//! # Ports Layer
//!
//! - `inbound`: the index API used by admission, the runtime and lookups
//! - `outbound`: the document store the index needs

pub mod inbound;
pub mod outbound;
