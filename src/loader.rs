//! Background loading pipeline.
//!
//! One worker thread owns the whole decode: open the dataset, publish
//! metadata, stream overview tiles row-major, then stream refinement tiles
//! parent by parent. `open` requests are never blocking; a request arriving
//! mid-load flips a restart flag the worker checks between units of work, so
//! stale work is abandoned rather than racing the new load to publication.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dataset::{GridDataset, GridProvider};
use crate::error::Result;
use crate::meta::GridMetadata;
use crate::overview;
use crate::refinement;
use crate::tile::{TileIndex, TilePtr};

pub const DEFAULT_TILE_SIZE: u32 = 128;

/// Loader configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLoaderInfo {
    /// Edge length of an overview tile, in samples.
    pub tile_size: u32,
}

impl Default for GridLoaderInfo {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl GridLoaderInfo {
    /// Read a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

/// Events published by the background worker, in publication order.
#[derive(Debug, Clone)]
pub enum LoaderEvent {
    /// Fired once per successful dataset open, before any tile of that load.
    MetadataReady(GridMetadata),
    /// Fired once per published tile, overview or refinement.
    TileReady {
        tile: TilePtr,
        variable_resolution: bool,
    },
}

#[derive(Default)]
struct ControlState {
    path: PathBuf,
    restart: bool,
    abort: bool,
    meta: GridMetadata,
}

struct Shared {
    state: Mutex<ControlState>,
    wake: Condvar,
}

enum Directive {
    Proceed,
    Restart,
    Abort,
}

/// Controller for the background loading pipeline.
///
/// Owns the worker thread; dropping the controller aborts any in-flight load
/// and joins the worker.
pub struct GridLoader<P: GridProvider> {
    shared: Arc<Shared>,
    events: Receiver<LoaderEvent>,
    sender: Sender<LoaderEvent>,
    worker: Option<JoinHandle<()>>,
    provider: Option<P>,
    tile_size: u32,
}

impl<P: GridProvider> GridLoader<P> {
    pub fn new(provider: P, info: &GridLoaderInfo) -> Self {
        let tile_size = if info.tile_size == 0 {
            warn!(
                "tile_size 0 is not usable, falling back to {}",
                DEFAULT_TILE_SIZE
            );
            DEFAULT_TILE_SIZE
        } else {
            info.tile_size
        };
        let (sender, events) = mpsc::channel();
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ControlState::default()),
                wake: Condvar::new(),
            }),
            events,
            sender,
            worker: None,
            provider: Some(provider),
            tile_size,
        }
    }

    /// Request a (re)load of the dataset at `path`. The first call spawns the
    /// worker; later calls preempt whatever it is doing. Never blocks; the
    /// outcome is observed only through published events.
    pub fn open(&mut self, path: impl AsRef<Path>) {
        let mut state = self.shared.state.lock().unwrap();
        state.path = path.as_ref().to_path_buf();
        if let Some(provider) = self.provider.take() {
            let shared = Arc::clone(&self.shared);
            let sender = self.sender.clone();
            let tile_size = self.tile_size;
            self.worker = Some(thread::spawn(move || run(provider, shared, sender, tile_size)));
        } else {
            state.restart = true;
            self.shared.wake.notify_one();
        }
    }

    /// Drop published events the consumer has not collected yet. The worker
    /// keeps running.
    pub fn close(&mut self) {
        while self.events.try_recv().is_ok() {}
    }

    /// Last published metadata snapshot; the default value until the first
    /// load completes its metadata read.
    pub fn metadata(&self) -> GridMetadata {
        self.shared.state.lock().unwrap().meta
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Collect the next pending event without blocking.
    pub fn poll_event(&self) -> Option<LoaderEvent> {
        self.events.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event.
    pub fn wait_event(&self, timeout: Duration) -> Option<LoaderEvent> {
        self.events.recv_timeout(timeout).ok()
    }
}

impl<P: GridProvider> Drop for GridLoader<P> {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            state.abort = true;
            self.shared.wake.notify_one();
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("loader worker panicked during shutdown");
            }
        }
    }
}

fn run<P: GridProvider>(
    provider: P,
    shared: Arc<Shared>,
    events: Sender<LoaderEvent>,
    tile_size: u32,
) {
    loop {
        let path = {
            let mut state = shared.state.lock().unwrap();
            if state.abort {
                return;
            }
            state.restart = false;
            state.path.clone()
        };

        match provider.open(&path) {
            Ok(dataset) => {
                if let Directive::Abort = load(&dataset, &shared, &events, tile_size) {
                    return;
                }
            }
            // A failed open completes the load with nothing published.
            Err(err) => warn!("could not open {}: {}", path.display(), err),
        }

        let mut state = shared.state.lock().unwrap();
        while !state.restart && !state.abort {
            state = shared.wake.wait(state).unwrap();
        }
        if state.abort {
            return;
        }
    }
}

fn check_flags(shared: &Shared) -> Directive {
    let state = shared.state.lock().unwrap();
    if state.abort {
        Directive::Abort
    } else if state.restart {
        Directive::Restart
    } else {
        Directive::Proceed
    }
}

fn load<D: GridDataset>(
    dataset: &D,
    shared: &Shared,
    events: &Sender<LoaderEvent>,
    tile_size: u32,
) -> Directive {
    match check_flags(shared) {
        Directive::Proceed => {}
        directive => return directive,
    }

    let meta = GridMetadata::from_info(&dataset.info());
    info!("{} columns, {} rows", meta.ncols, meta.nrows);
    info!("spacing: {} x {}", meta.dx, meta.dy);
    info!(
        "ll corner: {}, {}",
        meta.sw_bottom_corner.x, meta.sw_bottom_corner.y
    );
    debug!("variable resolution? {}", meta.variable_resolution);

    {
        let mut state = shared.state.lock().unwrap();
        state.meta = meta;
    }
    let _ = events.send(LoaderEvent::MetadataReady(meta));

    let (tile_cols, tile_rows) = overview::tile_grid_extent(&meta, tile_size);
    let mut good_tiles: Vec<TilePtr> = Vec::new();

    for trow in 0..tile_rows {
        debug!("tile row: {}", trow);
        for tcol in 0..tile_cols {
            match check_flags(shared) {
                Directive::Proceed => {}
                directive => return directive,
            }
            let index = TileIndex::new(tcol, trow);
            let tile = match overview::load_overview_tile(dataset, index, &meta, tile_size) {
                Ok(tile) => tile,
                Err(err) => {
                    warn!("overview tile ({}, {}) read failed: {}", tcol, trow, err);
                    None
                }
            };
            // A read that has started is completed, but its result is never
            // published once a restart or abort is pending.
            match check_flags(shared) {
                Directive::Proceed => {}
                directive => return directive,
            }
            if let Some(tile) = tile {
                let tile = TilePtr::new(tile);
                good_tiles.push(Arc::clone(&tile));
                let _ = events.send(LoaderEvent::TileReady {
                    tile,
                    variable_resolution: false,
                });
            }
        }
    }

    if meta.variable_resolution {
        for parent in &good_tiles {
            for ti in 0..parent.nrows {
                for tj in 0..parent.ncols {
                    match check_flags(shared) {
                        Directive::Proceed => {}
                        directive => return directive,
                    }
                    let rel = TileIndex::new(tj, ti);
                    let tile = refinement::load_refinement_tile(dataset, rel, &meta, parent);
                    match check_flags(shared) {
                        Directive::Proceed => {}
                        directive => return directive,
                    }
                    if let Some(tile) = tile {
                        let _ = events.send(LoaderEvent::TileReady {
                            tile: TilePtr::new(tile),
                            variable_resolution: true,
                        });
                    }
                }
            }
        }
    }

    Directive::Proceed
}
