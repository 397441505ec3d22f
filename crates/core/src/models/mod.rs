pub mod movie;
pub mod runtime;

pub use movie::*;
pub use runtime::{InvalidRuntimeFormat, Runtime};
