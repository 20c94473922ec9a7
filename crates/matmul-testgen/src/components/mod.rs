mod compilation;
mod elem;
mod mode;
mod seed;
mod shape;

pub use compilation::*;
pub use elem::*;
pub use mode::*;
pub use seed::*;
pub use shape::*;
