//! HTML scraping pipeline: page markup to raw sections to a typed snapshot.

mod dom;
mod games;
mod leaders;
pub mod normalizer;
pub mod parser;
pub mod raw;
mod standings;
pub mod text;

pub use normalizer::{derive_game_id, normalize, NormalizeOptions, NormalizeReport, Normalized};
pub use parser::parse;
pub use raw::{PageKind, RawGameRow, RawLeaderRow, RawSection, RawStandingRow, RawStandings};
