#![warn(missing_debug_implementations)]

//! Generator of end-to-end matmul tests.
//!
//! From ranges of matmul shapes, element types and compilation infos, two MLIR modules are
//! generated: one defining a test function per distinct (shape, type, compilation info)
//! combination, and one calling these functions with deterministic pseudorandom inputs and
//! checking their results.

/// Parameters of the generated tests.
pub mod components;
/// Configuration of the generator itself.
pub mod config;
pub mod synthesis;

mod args;
mod error;
mod expand;
mod module;

pub use args::*;
pub use error::*;
pub use expand::*;
pub use module::*;
