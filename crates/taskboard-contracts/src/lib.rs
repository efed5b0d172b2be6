// Public contracts for the Taskboard API
// This crate defines the DTOs shared by the API binary and its tests.

pub mod common;
pub mod task;

pub use common::*;
pub use task::*;
