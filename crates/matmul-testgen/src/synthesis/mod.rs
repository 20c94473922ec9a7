//! Text synthesis of the generated test functions and of the calls exercising them.

mod call;
mod function;

pub use call::*;
pub use function::*;
