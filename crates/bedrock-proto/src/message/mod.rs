//! IRC message model: parsing, construction, and wire serialization.

mod parse;
mod serialize;
pub mod tags;
mod types;

pub use self::types::{Message, Tag};
