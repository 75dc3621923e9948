//! Step-by-step maze generation and solving.
//!
//! Every generator and solver is a resumable state machine over a [`maze::Grid`]:
//! call `step` until `not_done` turns false, inspecting the grid in between.

pub mod app;
pub mod error;
pub mod generators;
pub mod maze;
pub mod solvers;
