//! # Flowlay Types
//!
//! Shared types for the flowlay ecosystem.
//!
//! This crate provides the data model consumed and produced by the layout
//! engine, designed to be:
//! 1. Serializable for storage and API communication
//! 2. Independent of any rendering framework
//! 3. Cheap to construct from upstream trace-collection systems

pub mod node;
pub mod step;

pub use node::*;
pub use step::*;
