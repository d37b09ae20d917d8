mod aligned_read;
mod consts;

pub use aligned_read::*;
pub use consts::*;
