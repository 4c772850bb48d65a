//! Queue-to-topic relay: the engine and the Lambda adapter around it

pub mod engine;
pub mod handler;

pub use engine::{CycleReport, CycleState, RelayEngine};
pub use handler::handler;
