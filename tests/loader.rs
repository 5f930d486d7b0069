use std::time::{Duration, Instant};

use bathytile::dataset::memory::MemoryGridProvider;
use bathytile::{GridLoader, GridLoaderInfo, LoaderEvent};

mod common;

const QUIET: Duration = Duration::from_millis(300);

fn collect_events<P: bathytile::dataset::GridProvider>(loader: &GridLoader<P>) -> Vec<LoaderEvent> {
    let mut events = Vec::new();
    while let Some(event) = loader.wait_event(QUIET) {
        events.push(event);
    }
    events
}

fn single_block_provider() -> MemoryGridProvider {
    let mut provider = MemoryGridProvider::new();
    provider.insert("block.grid", common::single_block_dataset());
    provider
}

#[test]
fn metadata_arrives_before_any_tile() {
    let mut loader = GridLoader::new(single_block_provider(), &GridLoaderInfo::default());
    loader.open("block.grid");

    let events = collect_events(&loader);
    assert!(!events.is_empty());
    assert!(matches!(events[0], LoaderEvent::MetadataReady(_)));
    assert!(events[1..]
        .iter()
        .all(|event| matches!(event, LoaderEvent::TileReady { .. })));
}

#[test]
fn single_block_load_publishes_one_tile() {
    let mut loader = GridLoader::new(single_block_provider(), &GridLoaderInfo::default());
    loader.open("block.grid");

    let events = collect_events(&loader);
    let tiles: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            LoaderEvent::TileReady { tile, .. } => Some(tile),
            _ => None,
        })
        .collect();
    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles[0].data.elevations.len(), 128 * 128);

    let meta = loader.metadata();
    assert_eq!((meta.ncols, meta.nrows), (300, 300));
}

#[test]
fn overview_tiles_arrive_in_row_major_order() {
    let mut provider = MemoryGridProvider::new();
    provider.insert("flat.grid", common::flat_dataset(300, 300, 1.0, 1.0, -4.0));
    let mut loader = GridLoader::new(provider, &GridLoaderInfo::default());
    loader.open("flat.grid");

    let indices: Vec<_> = collect_events(&loader)
        .iter()
        .filter_map(|event| match event {
            LoaderEvent::TileReady { tile, .. } => Some(tile.index),
            _ => None,
        })
        .collect();
    assert_eq!(indices.len(), 9);
    let mut expected = Vec::new();
    for row in 0..3 {
        for col in 0..3 {
            expected.push(bathytile::TileIndex::new(col, row));
        }
    }
    assert_eq!(indices, expected);
}

#[test]
fn refinement_tiles_follow_their_parents() {
    let mut dataset = common::flat_dataset(40, 40, 1.0, 1.0, -4.0);
    dataset.add_refinement(5, 5, (2, 2), (0.5, 0.5), (0.0, 0.0), &common::constant_samples(4, -6.0));
    dataset.add_refinement(6, 5, (2, 2), (0.5, 0.5), (0.0, 0.0), &common::constant_samples(4, -6.5));
    let mut provider = MemoryGridProvider::new();
    provider.insert("vr.grid", dataset);

    let mut loader = GridLoader::new(provider, &GridLoaderInfo { tile_size: 32 });
    loader.open("vr.grid");

    let events = collect_events(&loader);
    let overview_count = events
        .iter()
        .filter(|event| {
            matches!(
                event,
                LoaderEvent::TileReady {
                    variable_resolution: false,
                    ..
                }
            )
        })
        .count();
    let refined: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            LoaderEvent::TileReady {
                tile,
                variable_resolution: true,
            } => Some(tile.lower_left),
            _ => None,
        })
        .collect();

    assert_eq!(overview_count, 4);
    assert_eq!(refined.len(), 2);
    assert!(refined.contains(&bathytile::TileIndex::new(5, 5)));
    assert!(refined.contains(&bathytile::TileIndex::new(5, 6)));

    // Every overview tile precedes every refinement tile here: the lone
    // refined parent is processed after the overview pass completes.
    let first_vr = events
        .iter()
        .position(|event| {
            matches!(
                event,
                LoaderEvent::TileReady {
                    variable_resolution: true,
                    ..
                }
            )
        })
        .unwrap();
    let tiles_before_vr = events[..first_vr]
        .iter()
        .filter(|event| matches!(event, LoaderEvent::TileReady { .. }))
        .count();
    assert_eq!(tiles_before_vr, overview_count);
}

#[test]
fn reopen_preempts_the_stale_load() {
    let mut provider = MemoryGridProvider::new();
    provider.insert(
        "slow.grid",
        common::flat_dataset(300, 300, 1.0, 1.0, -4.0)
            .with_read_delay(Duration::from_millis(25)),
    );
    provider.insert("fast.grid", common::flat_dataset(50, 50, 1.0, 1.0, -2.0));

    let mut loader = GridLoader::new(provider, &GridLoaderInfo::default());
    loader.open("slow.grid");
    std::thread::sleep(Duration::from_millis(40));
    loader.open("fast.grid");

    let events = collect_events(&loader);
    let fast_meta_at = events
        .iter()
        .position(|event| {
            matches!(event, LoaderEvent::MetadataReady(meta) if meta.ncols == 50)
        })
        .expect("the new load publishes its metadata");

    // After the new dataset's metadata, nothing from the stale load appears.
    for event in &events[fast_meta_at..] {
        if let LoaderEvent::TileReady { tile, .. } = event {
            assert_eq!((tile.ncols, tile.nrows), (50, 50));
        }
    }
    assert_eq!((loader.metadata().ncols, loader.metadata().nrows), (50, 50));
}

#[test]
fn dropping_the_loader_mid_load_joins_promptly() {
    let mut provider = MemoryGridProvider::new();
    provider.insert(
        "slow.grid",
        common::flat_dataset(300, 300, 1.0, 1.0, -4.0)
            .with_read_delay(Duration::from_millis(25)),
    );
    let mut loader = GridLoader::new(provider, &GridLoaderInfo::default());
    loader.open("slow.grid");
    std::thread::sleep(Duration::from_millis(40));

    let started = Instant::now();
    drop(loader);
    // One in-flight block read at most, never the rest of the pipeline.
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn failed_open_publishes_nothing() {
    let mut loader = GridLoader::new(MemoryGridProvider::new(), &GridLoaderInfo::default());
    loader.open("missing.grid");

    assert!(loader.wait_event(QUIET).is_none());
    assert_eq!(loader.metadata(), bathytile::GridMetadata::default());

    // The worker parked; a later open on the same loader still works.
}

#[test]
fn reopen_after_failed_open_recovers() {
    let mut provider = MemoryGridProvider::new();
    provider.insert("block.grid", common::single_block_dataset());
    let mut loader = GridLoader::new(provider, &GridLoaderInfo::default());

    loader.open("missing.grid");
    assert!(loader.wait_event(QUIET).is_none());

    loader.open("block.grid");
    let events = collect_events(&loader);
    assert!(matches!(events.first(), Some(LoaderEvent::MetadataReady(_))));
}

#[test]
fn close_drops_uncollected_events() {
    let mut loader = GridLoader::new(single_block_provider(), &GridLoaderInfo::default());
    loader.open("block.grid");

    // Let the whole (small) load finish, then discard everything queued.
    std::thread::sleep(Duration::from_millis(400));
    loader.close();
    assert!(loader.poll_event().is_none());
}

#[test]
fn zero_tile_size_falls_back_to_default() {
    let loader = GridLoader::new(MemoryGridProvider::new(), &GridLoaderInfo { tile_size: 0 });
    assert_eq!(loader.tile_size(), bathytile::DEFAULT_TILE_SIZE);
}
