//! Stream a synthetic variable-resolution grid and summarize what arrives.
//!
//! Run with `cargo run --example stream_tiles`. Writes the first overview
//! tile's normal map to `normal_map.png` in the working directory.

use std::time::Duration;

use bathytile::dataset::memory::{MemoryDataset, MemoryGridProvider};
use bathytile::dataset::{GridInfo, RefinementSample};
use bathytile::{GridLoader, GridLoaderInfo, LoaderEvent};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn build_dataset() -> MemoryDataset {
    let ncols = 300u32;
    let nrows = 300u32;
    let info = GridInfo {
        dx: 2.0,
        dy: 2.0,
        ncols,
        nrows,
        ll_corner_x: 410_000.0,
        ll_corner_y: 5_000_000.0,
        min_elevation: -55.0,
        max_elevation: -5.0,
        variable_resolution: false,
    };

    // A gentle bowl: deepest at the grid center.
    let mut elevations = Vec::with_capacity((ncols * nrows) as usize);
    for row in 0..nrows {
        for col in 0..ncols {
            let u = col as f32 / (ncols - 1) as f32 - 0.5;
            let v = row as f32 / (nrows - 1) as f32 - 0.5;
            elevations.push(-55.0 + 50.0 * (u * u + v * v));
        }
    }
    let mut dataset = MemoryDataset::new(info, elevations);

    // A handful of refined cells near the center of the bowl.
    for (row, col) in [(149u32, 149u32), (149, 150), (150, 149), (150, 150)] {
        let samples: Vec<RefinementSample> = (0..16)
            .map(|k| RefinementSample::new(-54.0 - 0.05 * k as f32, 0.3))
            .collect();
        dataset.add_refinement(row, col, (4, 4), (0.5, 0.5), (0.25, 0.25), &samples);
    }
    dataset
}

fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut provider = MemoryGridProvider::new();
    provider.insert("demo.grid", build_dataset());

    let mut loader = GridLoader::new(provider, &GridLoaderInfo::default());
    loader.open("demo.grid");

    let mut overview_tiles = 0usize;
    let mut refinement_tiles = 0usize;
    let mut first_normal_map = None;

    while let Some(event) = loader.wait_event(Duration::from_millis(500)) {
        match event {
            LoaderEvent::MetadataReady(meta) => {
                info!(
                    "metadata: {}x{} samples, size {:?}",
                    meta.ncols, meta.nrows, meta.size
                );
            }
            LoaderEvent::TileReady {
                tile,
                variable_resolution,
            } => {
                if variable_resolution {
                    refinement_tiles += 1;
                } else {
                    if first_normal_map.is_none() {
                        first_normal_map = Some(tile.data.normal_map.clone());
                    }
                    overview_tiles += 1;
                }
            }
        }
    }

    if let Some(map) = first_normal_map {
        map.save("normal_map.png").expect("failed to write PNG");
        info!("wrote normal_map.png");
    }

    let meta = loader.metadata();
    let summary = serde_json::json!({
        "tile_size": loader.tile_size(),
        "grid": { "ncols": meta.ncols, "nrows": meta.nrows },
        "overview_tiles": overview_tiles,
        "refinement_tiles": refinement_tiles,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).expect("failed to serialize summary")
    );
}
