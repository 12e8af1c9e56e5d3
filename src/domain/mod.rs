pub mod league;
pub mod snapshot;
pub mod state;

pub use league::*;
pub use snapshot::*;
pub use state::*;
