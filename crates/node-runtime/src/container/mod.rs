//! # Container
//!
//! Configuration and dependency injection for the node.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, NodeConfig, StorageBackend};
pub use subsystems::{ContainerError, SubsystemContainer};
