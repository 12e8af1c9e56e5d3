pub mod data;
pub mod system;

pub use data::*;
pub use system::*;
