pub mod statics;

pub use statics::*;
