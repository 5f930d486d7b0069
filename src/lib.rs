//! Streaming tiler for large, possibly variable-resolution elevation grids.
//!
//! A [`GridLoader`] runs the whole decode on one background thread: it opens
//! a dataset through the [`dataset`] facade, publishes a [`GridMetadata`]
//! snapshot, streams fixed-size overview tiles in row-major order, then
//! streams variable-resolution refinement tiles for each surviving overview
//! tile. Tiles arrive as immutable [`Tile`]s through [`LoaderEvent`]s; a new
//! `open` call preempts the in-flight load between units of work instead of
//! racing it to publication.

pub mod arena;
pub mod bounds;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod meta;
pub mod normals;
pub mod overview;
pub mod refinement;
pub mod tile;

pub use arena::TileArena;
pub use bounds::Bounds;
pub use error::{Error, Result};
pub use loader::{GridLoader, GridLoaderInfo, LoaderEvent, DEFAULT_TILE_SIZE};
pub use meta::GridMetadata;
pub use tile::{Tile, TileData, TileIndex, TilePtr, NULL_ELEVATION};
