use std::sync::Arc;

use maprender::{
    Bitmap, LabelPlacement, Paint, Point, PointTextContainer, Rectangle, SymbolContainer, Tile,
};

const TILE_SIZE: i32 = 256;

fn tile(x: i64, y: i64) -> Tile {
    Tile::new(x, y, 5, TILE_SIZE)
}

/// Caption with a `chars * 10` by 10 boundary.
fn caption(text: &str, x: f64, y: f64) -> PointTextContainer {
    let paint = Paint::fill(0xff000000).with_text_size(10.0);
    PointTextContainer::new(text, x, y, paint, None)
}

/// 16x16 symbol centered on the anchor, plus the caption referencing it.
fn poi(text: &str, x: f64, y: f64) -> (PointTextContainer, Arc<SymbolContainer>) {
    let symbol = Arc::new(SymbolContainer::new(
        Arc::new(Bitmap::filled(16, 16, 0xff990000)),
        Point::new(x - 8.0, y - 8.0),
    ));
    let label = caption(text, x, y).with_symbol(Arc::clone(&symbol));
    (label, symbol)
}

fn boundary(label: &PointTextContainer) -> Rectangle {
    label.boundary()
}

fn overlap_area(a: &Rectangle, b: &Rectangle) -> f64 {
    let width = a.right.min(b.right) - a.left.max(b.left);
    let height = a.bottom.min(b.bottom) - a.top.max(b.top);
    if width > 0.0 && height > 0.0 {
        width * height
    } else {
        0.0
    }
}

#[test]
fn isolated_poi_takes_the_position_above_its_symbol() {
    let mut placement = LabelPlacement::new();
    let (label, symbol) = poi("XXXX", 128.0, 128.0);
    let mut symbols = vec![symbol];
    let mut area_labels = Vec::new();

    let placed = placement.place_labels(vec![label], &mut symbols, &mut area_labels, &tile(10, 10));

    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].x, 108.0);
    assert_eq!(placed[0].y, 116.0);
}

#[test]
fn nearby_pois_place_without_collision() {
    let mut placement = LabelPlacement::new();
    let (label_a, symbol_a) = poi("XXXX", 100.0, 128.0);
    let (label_b, symbol_b) = poi("YYYY", 130.0, 128.0);
    let mut symbols = vec![symbol_a, symbol_b];
    let mut area_labels = Vec::new();

    let placed = placement.place_labels(
        vec![label_a, label_b],
        &mut symbols,
        &mut area_labels,
        &tile(10, 10),
    );

    assert_eq!(placed.len(), 2);
    // The first caption wins the position above its symbol.
    assert_eq!((placed[0].x, placed[0].y), (80.0, 116.0));

    // No surviving pair of boundaries overlaps.
    for i in 0..placed.len() {
        for j in i + 1..placed.len() {
            assert_eq!(
                overlap_area(&boundary(&placed[i]), &boundary(&placed[j])),
                0.0
            );
        }
    }
    // Neither caption covers either symbol.
    for label in &placed {
        for symbol in &symbols {
            assert_eq!(overlap_area(&boundary(label), &symbol.boundary()), 0.0);
        }
    }
}

#[test]
fn labels_do_not_cross_into_drawn_neighbors() {
    let mut placement = LabelPlacement::new();

    // The eastern neighbor has already been drawn.
    let east = tile(11, 10);
    placement.dependency_cache_mut().set_current_tile(&east);
    placement.dependency_cache_mut().record(&[], &[], &[]);

    let current = tile(10, 10);
    let near_edge = caption("XXXX", 250.0, 128.0);
    let interior = caption("YYYY", 100.0, 128.0);
    let mut symbols = Vec::new();
    let mut area_labels = Vec::new();

    let placed = placement.place_labels(
        vec![near_edge, interior],
        &mut symbols,
        &mut area_labels,
        &current,
    );

    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].text, "YYYY");
    // Nothing may stick out over the drawn edge.
    for label in &placed {
        assert!(label.boundary().right <= TILE_SIZE as f64);
    }
}

#[test]
fn duplicate_caption_across_the_seam_is_suppressed() {
    let mut placement = LabelPlacement::new();

    // The western tile committed a caption "Y" that spills east.
    let west = tile(10, 10);
    placement.dependency_cache_mut().set_current_tile(&west);
    placement
        .dependency_cache_mut()
        .record(&[caption("Y", 250.0, 128.0)], &[], &[]);

    // The eastern tile has its own candidate for the same caption.
    let east = tile(11, 10);
    let mut symbols = Vec::new();
    let mut area_labels = Vec::new();
    let placed = placement.place_labels(
        vec![caption("Y", -5.0, 128.0)],
        &mut symbols,
        &mut area_labels,
        &east,
    );

    assert!(placed.is_empty());
}

#[test]
fn area_labels_are_centered_and_thinned() {
    let mut placement = LabelPlacement::new();
    let mut symbols = Vec::new();
    let mut area_labels = vec![
        caption("XXXX", 128.0, 128.0),
        // Overlaps the first once centered; the earlier one is kept.
        caption("YYYY", 130.0, 130.0),
        caption("ZZZZ", 128.0, 40.0),
    ];

    let placed = placement.place_labels(Vec::new(), &mut symbols, &mut area_labels, &tile(10, 10));
    assert!(placed.is_empty());

    assert_eq!(area_labels.len(), 2);
    assert_eq!(area_labels[0].text, "XXXX");
    assert_eq!(area_labels[0].x, 108.0);
    assert_eq!(area_labels[1].text, "ZZZZ");
}

#[test]
fn symbols_under_area_labels_are_dropped() {
    let mut placement = LabelPlacement::new();
    let (_, symbol) = poi("XXXX", 128.0, 124.0);
    let mut symbols = vec![symbol];
    let mut area_labels = vec![caption("XXXX", 128.0, 128.0)];

    placement.place_labels(Vec::new(), &mut symbols, &mut area_labels, &tile(10, 10));

    assert!(symbols.is_empty());
    assert_eq!(area_labels.len(), 1);
}

#[test]
fn caption_loses_its_symbol_when_the_symbol_is_dropped() {
    let mut placement = LabelPlacement::new();

    // Two symbols on top of each other: the later one is removed.
    let (label_a, symbol_a) = poi("XXXX", 60.0, 60.0);
    let symbol_b = Arc::new(SymbolContainer::new(
        Arc::new(Bitmap::filled(16, 16, 0xff990000)),
        Point::new(54.0, 54.0),
    ));
    let label_b = caption("YYYY", 62.0, 90.0).with_symbol(Arc::clone(&symbol_b));
    let mut symbols = vec![symbol_a, symbol_b];
    let mut area_labels = Vec::new();

    let placed = placement.place_labels(
        vec![label_a, label_b],
        &mut symbols,
        &mut area_labels,
        &tile(10, 10),
    );

    assert_eq!(symbols.len(), 1);
    // The orphaned caption still places, now without a symbol and centered
    // on its anchor.
    let second = placed
        .iter()
        .find(|label| label.text == "YYYY")
        .expect("caption without symbol still places");
    assert!(second.symbol.is_none());
    assert_eq!((second.x, second.y), (42.0, 90.0));
}

#[test]
fn placement_commits_spills_for_the_next_tile() {
    let mut placement = LabelPlacement::new();
    let mut symbols = Vec::new();
    let mut area_labels = Vec::new();

    let current = tile(10, 10);
    let placed = placement.place_labels(
        vec![caption("Seestrasse", 250.0, 128.0)],
        &mut symbols,
        &mut area_labels,
        &current,
    );
    assert_eq!(placed.len(), 1);

    // The caption was placed centered at the anchor and crosses the seam, so
    // the eastern tile must carry the mirrored record.
    let cache = placement.dependency_cache();
    assert!(cache.drawn(&current));
    let east = cache.get(&current.right()).expect("east record exists");
    assert_eq!(east.labels.len(), 1);
    assert_eq!(east.labels[0].value.text, "Seestrasse");
}
