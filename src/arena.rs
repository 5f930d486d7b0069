//! Consumer-side cache of published tiles.
//!
//! Tiles are kept in index-keyed maps and adjacency is resolved by lookup,
//! so neighboring tiles never hold references to each other. A refinement
//! tile's parent is derived from its absolute lower-left sample index and
//! the tile size.

use std::collections::BTreeMap;

use crate::tile::{TileIndex, TilePtr};

#[derive(Debug)]
pub struct TileArena {
    tile_size: u32,
    overview: BTreeMap<TileIndex, TilePtr>,
    refinements: BTreeMap<TileIndex, BTreeMap<TileIndex, TilePtr>>,
}

impl TileArena {
    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size,
            overview: BTreeMap::new(),
            refinements: BTreeMap::new(),
        }
    }

    /// Store a published tile. Refinement tiles are filed under the overview
    /// tile whose footprint contains them.
    pub fn insert(&mut self, tile: TilePtr, variable_resolution: bool) {
        if variable_resolution {
            let parent = TileIndex::new(
                tile.lower_left.col / self.tile_size,
                tile.lower_left.row / self.tile_size,
            );
            self.refinements
                .entry(parent)
                .or_default()
                .insert(tile.index, tile);
        } else {
            self.overview.insert(tile.index, tile);
        }
    }

    pub fn get(&self, index: TileIndex) -> Option<&TilePtr> {
        self.overview.get(&index)
    }

    pub fn north(&self, index: TileIndex) -> Option<&TilePtr> {
        self.get(TileIndex::new(index.col, index.row + 1))
    }

    pub fn east(&self, index: TileIndex) -> Option<&TilePtr> {
        self.get(TileIndex::new(index.col + 1, index.row))
    }

    pub fn north_east(&self, index: TileIndex) -> Option<&TilePtr> {
        self.get(TileIndex::new(index.col + 1, index.row + 1))
    }

    /// Refinement tiles filed under one overview tile, in index order.
    pub fn refinements_of(&self, parent: TileIndex) -> impl Iterator<Item = &TilePtr> {
        self.refinements
            .get(&parent)
            .into_iter()
            .flat_map(|tiles| tiles.values())
    }

    /// Forget every cached tile. The expected reaction to a new metadata
    /// event, which starts a new tile generation.
    pub fn clear(&mut self) {
        self.overview.clear();
        self.refinements.clear();
    }

    pub fn len(&self) -> usize {
        self.overview.len()
            + self
                .refinements
                .values()
                .map(|tiles| tiles.len())
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
