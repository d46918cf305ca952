//! # Flowlay Layout
//!
//! A layout engine that converts a linear execution trace — user
//! requests, LLM calls, tool invocations, sub-agent delegations,
//! workflow fork/join — into a positioned hierarchical diagram.
//!
//! The data flows strictly one way: step stream -> trace interpreter ->
//! layout tree -> measure -> position -> edges + canvas -> final
//! [`LayoutResult`]. The one entry point is [`LayoutEngine::build`] (or
//! the free [`build`] with default parameters), which runs the passes in
//! fixed order so a half-measured tree is never observable.
//!
//! ```
//! use flowlay_layout::{build, NameMap, StepType, TraceStep};
//!
//! let steps = vec![TraceStep::new("s1", StepType::UserRequest)
//!     .with_owning_task("task-1")
//!     .with_target("assistant")];
//! let layout = build(&steps, &NameMap::new());
//! assert_eq!(layout.nodes.len(), 2);
//! ```

pub mod edges;
pub mod engine;
pub mod error;
pub mod interpreter;
pub mod loader;
pub mod renderer;

mod canvas;
mod measure;
mod position;

pub use engine::{build, LayoutEngine};
pub use error::LayoutError;
pub use flowlay_types::*;
pub use renderer::LayoutRenderer;
