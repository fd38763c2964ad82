//! # Domain Layer
//!
//! Pure token logic with no I/O dependencies.
//! This is the inner layer of the hexagonal architecture.

pub mod builder;
pub mod codec;
pub mod errors;
pub mod token;
pub mod validator;
