use std::sync::Arc;

use maprender::{
    Bitmap, DependencyCache, Paint, Point, PointTextContainer, SymbolContainer, Tile,
};

const TILE_SIZE: i32 = 256;

fn tile(x: i64, y: i64) -> Tile {
    Tile::new(x, y, 5, TILE_SIZE)
}

/// A caption whose boundary is `chars * 10` wide and 10 tall.
fn label(text: &str, x: f64, y: f64) -> PointTextContainer {
    let paint = Paint::fill(0xff000000).with_text_size(10.0);
    PointTextContainer::new(text, x, y, paint, None)
}

fn symbol(x: f64, y: f64, size: i32) -> Arc<SymbolContainer> {
    Arc::new(SymbolContainer::new(
        Arc::new(Bitmap::filled(size, size, 0xff336699)),
        Point::new(x, y),
    ))
}

fn mark_drawn(cache: &mut DependencyCache, tile: &Tile) {
    cache.set_current_tile(tile);
    cache.record(&[], &[], &[]);
}

#[test]
fn record_mirrors_right_spill_into_neighbor() {
    let mut cache = DependencyCache::new();
    let current = tile(10, 10);
    cache.set_current_tile(&current);

    // 40 px wide, anchored at 250: crosses the right edge.
    cache.record(&[label("Burg", 250.0, 128.0)], &[], &[]);

    let own = cache.get(&current).expect("current record exists");
    assert!(own.drawn);
    assert_eq!(own.labels.len(), 1);
    assert_eq!(own.labels[0].point, Point::new(250.0, 128.0));

    let right = cache.get(&current.right()).expect("right record exists");
    assert_eq!(right.labels.len(), 1);
    assert_eq!(right.labels[0].point, Point::new(250.0 - TILE_SIZE as f64, 128.0));
    assert_eq!(right.labels[0].value.text, "Burg");
}

#[test]
fn corner_spill_touches_three_neighbors() {
    let mut cache = DependencyCache::new();
    let current = tile(10, 10);
    cache.set_current_tile(&current);

    // Crosses the top and the right edge at once.
    cache.record(&[label("Burg", 250.0, 5.0)], &[], &[]);

    let ts = TILE_SIZE as f64;
    for (neighbor, expected) in [
        (current.above(), Point::new(250.0, 5.0 + ts)),
        (current.right(), Point::new(250.0 - ts, 5.0)),
        (current.above_right(), Point::new(250.0 - ts, 5.0 + ts)),
    ] {
        let record = cache.get(&neighbor).expect("neighbor record exists");
        assert_eq!(record.labels.len(), 1, "neighbor {:?}", neighbor);
        assert_eq!(record.labels[0].point, expected);
    }
}

#[test]
fn corner_is_skipped_when_an_axial_neighbor_is_drawn() {
    let mut cache = DependencyCache::new();
    let current = tile(10, 10);
    mark_drawn(&mut cache, &current.right());
    cache.set_current_tile(&current);

    cache.record(&[label("Burg", 250.0, 5.0)], &[], &[]);

    // The drawn right neighbor gets nothing, and neither does the corner.
    assert!(cache.get(&current.right()).unwrap().labels.is_empty());
    assert!(cache.get(&current.above_right()).unwrap().labels.is_empty());
    assert_eq!(cache.get(&current.above()).unwrap().labels.len(), 1);
}

#[test]
fn label_spilling_multiple_edges_is_recorded_once_locally() {
    let mut cache = DependencyCache::new();
    let current = tile(10, 10);
    cache.set_current_tile(&current);

    cache.record(&[label("Burg", 250.0, 5.0)], &[], &[]);

    assert_eq!(cache.get(&current).unwrap().labels.len(), 1);
}

#[test]
fn interior_items_are_not_recorded() {
    let mut cache = DependencyCache::new();
    let current = tile(10, 10);
    cache.set_current_tile(&current);

    cache.record(&[label("Burg", 100.0, 100.0)], &[symbol(100.0, 100.0, 16)], &[]);

    let own = cache.get(&current).unwrap();
    assert!(own.drawn);
    assert!(own.labels.is_empty());
    assert!(own.symbols.is_empty());
}

#[test]
fn record_twice_equals_one_concatenated_call() {
    let first = vec![label("Burg", 250.0, 128.0)];
    let second = vec![label("Dom", -10.0, 40.0)];

    let mut split = DependencyCache::new();
    split.set_current_tile(&tile(10, 10));
    split.record(&first, &[], &[]);
    split.record(&second, &[], &[]);

    let mut joint = DependencyCache::new();
    joint.set_current_tile(&tile(10, 10));
    let both: Vec<_> = first.iter().chain(second.iter()).cloned().collect();
    joint.record(&both, &[], &[]);

    let current = tile(10, 10);
    for probe in [
        current.clone(),
        current.left(),
        current.right(),
        current.above(),
        current.below(),
        current.above_left(),
        current.above_right(),
        current.below_left(),
        current.below_right(),
    ] {
        let split_record = split.get(&probe).unwrap();
        let joint_record = joint.get(&probe).unwrap();
        let split_entries: Vec<_> = split_record
            .labels
            .iter()
            .map(|dependency| (dependency.value.text.clone(), dependency.point))
            .collect();
        let joint_entries: Vec<_> = joint_record
            .labels
            .iter()
            .map(|dependency| (dependency.value.text.clone(), dependency.point))
            .collect();
        assert_eq!(split_entries, joint_entries, "records differ on {:?}", probe);
    }
}

#[test]
fn duplicate_text_from_neighbor_is_suppressed() {
    let mut cache = DependencyCache::new();
    let west = tile(10, 10);
    cache.set_current_tile(&west);
    cache.record(&[label("Y", 250.0, 128.0)], &[], &[]);

    // The east tile now carries the mirrored "Y"; a local candidate with the
    // same text and paints must fall away.
    let east = tile(11, 10);
    cache.set_current_tile(&east);
    let mut labels = vec![label("Y", -5.0, 128.0)];
    let mut area_labels = Vec::new();
    let mut symbols = Vec::new();
    cache.remove_overlapping(&mut labels, &mut area_labels, &mut symbols);
    assert!(labels.is_empty());
}

#[test]
fn differing_text_survives_unless_rectangles_clash() {
    let mut cache = DependencyCache::new();
    let west = tile(10, 10);
    cache.set_current_tile(&west);
    cache.record(&[label("Y", 250.0, 128.0)], &[], &[]);

    let east = tile(11, 10);
    cache.set_current_tile(&east);
    // Far from the mirrored label, different text: survives.
    let mut labels = vec![label("Z", 100.0, 40.0)];
    let mut area_labels = Vec::new();
    let mut symbols = Vec::new();
    cache.remove_overlapping(&mut labels, &mut area_labels, &mut symbols);
    assert_eq!(labels.len(), 1);

    // Same place as the mirrored label, different text: dropped.
    let mut labels = vec![label("Z", -5.0, 128.0)];
    cache.remove_overlapping(&mut labels, &mut area_labels, &mut symbols);
    assert!(labels.is_empty());
}

#[test]
fn out_of_drawn_area_removal_follows_drawn_flags() {
    let mut cache = DependencyCache::new();
    let current = tile(10, 10);
    mark_drawn(&mut cache, &current.above());
    cache.set_current_tile(&current);

    // Top edge spill toward the drawn upper neighbor.
    let mut area_labels = vec![label("Park", 100.0, 5.0)];
    cache.remove_out_of_drawn_areas_labels(&mut area_labels);
    assert!(area_labels.is_empty());

    // The same kind of spill toward a not-drawn neighbor stays.
    let mut area_labels = vec![label("Park", 100.0, 260.0)];
    cache.remove_out_of_drawn_areas_labels(&mut area_labels);
    assert_eq!(area_labels.len(), 1);
}

#[test]
fn world_edge_counts_as_not_drawn() {
    let mut cache = DependencyCache::new();
    let corner = Tile::new(0, 0, 5, TILE_SIZE);
    cache.set_current_tile(&corner);

    // Spills left and up, toward tiles outside the world.
    let mut area_labels = vec![label("Kap", -5.0, 5.0)];
    cache.remove_out_of_drawn_areas_labels(&mut area_labels);
    assert_eq!(area_labels.len(), 1);
}

#[test]
fn symbol_bottom_spill_routes_down_by_default() {
    let mut cache = DependencyCache::new();
    let current = tile(10, 10);
    cache.set_current_tile(&current);

    cache.record(&[], &[symbol(100.0, 250.0, 16)], &[]);

    let below = cache.get(&current.below()).unwrap();
    assert_eq!(below.symbols.len(), 1);
    assert_eq!(below.symbols[0].point, Point::new(100.0, 250.0 - TILE_SIZE as f64));
    assert!(cache.get(&current.above()).unwrap().symbols.is_empty());
}

#[test]
fn symbol_bottom_spill_can_be_routed_up_for_compatibility() {
    let mut cache = DependencyCache::new();
    cache.symbol_bottom_spill_to_upper = true;
    let current = tile(10, 10);
    cache.set_current_tile(&current);

    cache.record(&[], &[symbol(100.0, 250.0, 16)], &[]);

    let above = cache.get(&current.above()).unwrap();
    assert_eq!(above.symbols.len(), 1);
    assert_eq!(above.symbols[0].point, Point::new(100.0, 250.0 - TILE_SIZE as f64));
    assert!(cache.get(&current.below()).unwrap().symbols.is_empty());
}

#[test]
fn recorded_symbols_repel_new_symbols_with_margin() {
    let mut cache = DependencyCache::new();
    let current = tile(10, 10);
    cache.set_current_tile(&current);
    cache.record(&[], &[symbol(250.0, 100.0, 16)], &[]);

    cache.set_current_tile(&current);
    let mut labels = Vec::new();
    let mut area_labels = Vec::new();

    // 1 px away from the recorded symbol: inside the 2 px margin.
    let mut symbols = vec![symbol(267.0, 100.0, 16)];
    cache.remove_overlapping(&mut labels, &mut area_labels, &mut symbols);
    assert!(symbols.is_empty());

    // 3 px away: outside the margin.
    let mut symbols = vec![symbol(269.0, 100.0, 16)];
    cache.remove_overlapping(&mut labels, &mut area_labels, &mut symbols);
    assert_eq!(symbols.len(), 1);
}
