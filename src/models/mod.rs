//! Models module for the SDK
//!
//! Defines the stored board records that the exporters read. These mirror the
//! application's persisted JSON shape.

pub mod board;
pub mod tile;

pub use board::Board;
pub use tile::Tile;
