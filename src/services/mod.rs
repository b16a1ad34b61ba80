pub mod kb;

pub use kb::*;
