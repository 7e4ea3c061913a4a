use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::graphics::{Bitmap, Paint};
use crate::label_placement::ReferencePosition;
use crate::render_elements::{Point, PointTextContainer, Rectangle, SymbolContainer};
use crate::tile::Tile;

// Recorded symbols push away new arrivals by this margin.
const SYMBOL_INFLATION: f64 = 2.0;
// Recorded labels push away candidate positions by the same margin.
const LABEL_INFLATION: f64 = 2.0;

/// Label payload shared between the records of every tile it spills into.
/// Two labels are the same logical label when text and paints match, no
/// matter which tile's record they sit in.
#[derive(Debug, Clone)]
pub struct DependencyText {
    pub text: String,
    pub paint_front: Paint,
    pub paint_back: Option<Paint>,
    pub width: f64,
    pub height: f64,
}

impl DependencyText {
    fn from_label(label: &PointTextContainer) -> Self {
        Self {
            text: label.text.clone(),
            paint_front: label.paint_front.clone(),
            paint_back: label.paint_back.clone(),
            width: label.width,
            height: label.height,
        }
    }

    fn matches(&self, label: &PointTextContainer) -> bool {
        self.text == label.text
            && self.paint_front == label.paint_front
            && self.paint_back == label.paint_back
    }
}

/// One recorded item with the anchor it has in a particular tile's frame.
#[derive(Debug, Clone)]
pub struct Dependency<T> {
    pub value: T,
    pub point: Point,
}

impl<T> Dependency<T> {
    fn new(value: T, point: Point) -> Self {
        Self { value, point }
    }
}

/// Cross-tile state of one tile: whether it has been drawn, and every label
/// and symbol that this tile or a neighbor has placed into its frame.
#[derive(Debug, Default)]
pub struct DependencyOnTile {
    pub drawn: bool,
    pub labels: Vec<Dependency<Arc<DependencyText>>>,
    pub symbols: Vec<Dependency<Arc<Bitmap>>>,
}

impl DependencyOnTile {
    fn label_boundary(dependency: &Dependency<Arc<DependencyText>>) -> Rectangle {
        Rectangle::new(
            dependency.point.x,
            dependency.point.y - dependency.value.height,
            dependency.point.x + dependency.value.width,
            dependency.point.y,
        )
    }

    fn symbol_boundary(dependency: &Dependency<Arc<Bitmap>>) -> Rectangle {
        Rectangle::new(
            dependency.point.x,
            dependency.point.y,
            dependency.point.x + dependency.value.width() as f64,
            dependency.point.y + dependency.value.height() as f64,
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct EdgeSpill {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl EdgeSpill {
    fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct NeighborState {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

/// Shared placement state between a tile and its eight neighbors.
///
/// The cache is owned by a single rendering worker and is not thread safe.
/// Entries are created on demand and accumulate until the cache is dropped
/// with its render session.
pub struct DependencyCache {
    dependency_table: HashMap<Tile, DependencyOnTile>,
    current_tile: Option<Tile>,
    tile_size: f64,
    /// When set, symbols crossing the bottom edge are recorded on the upper
    /// neighbor instead of the lower one. Off by default; kept switchable so
    /// both routings stay covered by tests.
    pub symbol_bottom_spill_to_upper: bool,
}

impl DependencyCache {
    pub fn new() -> Self {
        Self {
            dependency_table: HashMap::new(),
            current_tile: None,
            tile_size: 0.0,
            symbol_bottom_spill_to_upper: false,
        }
    }

    /// Scopes all following operations to `tile`, creating empty records for
    /// the tile and its eight neighbors.
    pub fn set_current_tile(&mut self, tile: &Tile) {
        self.tile_size = tile.tile_size as f64;
        self.dependency_table.entry(tile.clone()).or_default();
        for neighbor in [
            tile.left(),
            tile.right(),
            tile.above(),
            tile.below(),
            tile.above_left(),
            tile.above_right(),
            tile.below_left(),
            tile.below_right(),
        ] {
            self.dependency_table.entry(neighbor).or_default();
        }
        self.current_tile = Some(tile.clone());
    }

    pub fn drawn(&self, tile: &Tile) -> bool {
        tile.is_in_bounds()
            && self
                .dependency_table
                .get(tile)
                .map_or(false, |dependency| dependency.drawn)
    }

    pub fn get(&self, tile: &Tile) -> Option<&DependencyOnTile> {
        self.dependency_table.get(tile)
    }

    /// Drops every label whose boundary crosses into a neighbor that has
    /// already been drawn. World-edge neighbors count as not drawn.
    pub fn remove_out_of_drawn_areas_labels(&self, labels: &mut Vec<PointTextContainer>) {
        let Some(neighbors) = self.neighbor_state() else {
            return;
        };
        labels.retain(|label| !self.crosses_drawn_edge(&label.boundary(), &neighbors));
    }

    /// Symbol flavor of [`Self::remove_out_of_drawn_areas_labels`].
    pub fn remove_out_of_drawn_areas_symbols(&self, symbols: &mut Vec<Arc<SymbolContainer>>) {
        let Some(neighbors) = self.neighbor_state() else {
            return;
        };
        symbols.retain(|symbol| !self.crosses_drawn_edge(&symbol.boundary(), &neighbors));
    }

    /// Drops labels, area labels and symbols that clash with anything already
    /// recorded in the current tile. Label-vs-label also suppresses seam
    /// duplicates by text/paint identity; recorded symbols repel new symbols
    /// with a two-pixel margin.
    pub fn remove_overlapping(
        &self,
        labels: &mut Vec<PointTextContainer>,
        area_labels: &mut Vec<PointTextContainer>,
        symbols: &mut Vec<Arc<SymbolContainer>>,
    ) {
        let Some(record) = self.current_record() else {
            return;
        };

        let keep_label = |label: &PointTextContainer| {
            let boundary = label.boundary();
            let clashes = record.labels.iter().any(|recorded| {
                recorded.value.matches(label)
                    || DependencyOnTile::label_boundary(recorded).intersects(&boundary)
            }) || record
                .symbols
                .iter()
                .any(|recorded| DependencyOnTile::symbol_boundary(recorded).intersects(&boundary));
            !clashes
        };
        labels.retain(keep_label);
        area_labels.retain(keep_label);

        symbols.retain(|symbol| {
            let boundary = symbol.boundary();
            let clashes = record
                .labels
                .iter()
                .any(|recorded| DependencyOnTile::label_boundary(recorded).intersects(&boundary))
                || record.symbols.iter().any(|recorded| {
                    DependencyOnTile::symbol_boundary(recorded)
                        .inflate(SYMBOL_INFLATION)
                        .intersects(&boundary)
                });
            !clashes
        });
    }

    /// Nullifies candidate positions that would spill into an already-drawn
    /// neighbor.
    pub fn remove_out_of_tile_reference_points(&self, refs: &mut [Option<ReferencePosition>]) {
        let Some(neighbors) = self.neighbor_state() else {
            return;
        };
        for slot in refs.iter_mut() {
            let remove = slot
                .as_ref()
                .map_or(false, |r| self.crosses_drawn_edge(&r.boundary(), &neighbors));
            if remove {
                *slot = None;
            }
        }
    }

    /// Nullifies candidate positions intersecting recorded labels (with a
    /// two-pixel margin) or recorded symbols.
    pub fn remove_overlapping_reference_points(&self, refs: &mut [Option<ReferencePosition>]) {
        let Some(record) = self.current_record() else {
            return;
        };
        for slot in refs.iter_mut() {
            let remove = slot.as_ref().map_or(false, |r| {
                let boundary = r.boundary();
                record.labels.iter().any(|recorded| {
                    DependencyOnTile::label_boundary(recorded)
                        .inflate(LABEL_INFLATION)
                        .intersects(&boundary)
                }) || record
                    .symbols
                    .iter()
                    .any(|recorded| DependencyOnTile::symbol_boundary(recorded).intersects(&boundary))
            });
            if remove {
                *slot = None;
            }
        }
    }

    /// Commits accepted items: marks the current tile drawn and mirrors every
    /// spilling label and symbol into the affected neighbor records, anchors
    /// translated by one tile size in the direction of the spill.
    pub fn record(
        &mut self,
        labels: &[PointTextContainer],
        symbols: &[Arc<SymbolContainer>],
        area_labels: &[PointTextContainer],
    ) {
        let Some(current) = self.current_tile.clone() else {
            return;
        };

        for label in labels.iter().chain(area_labels.iter()) {
            self.record_label(&current, label);
        }
        for symbol in symbols {
            self.record_symbol(&current, symbol);
        }

        if let Some(record) = self.dependency_table.get_mut(&current) {
            record.drawn = true;
        }
    }

    fn record_label(&mut self, current: &Tile, label: &PointTextContainer) {
        let spill = self.rect_spill(&label.boundary());
        if !spill.any() {
            return;
        }

        let value = Arc::new(DependencyText::from_label(label));
        let anchor = Point::new(label.x, label.y);
        trace!(text = %label.text, "label spills across tile seam");

        self.push_label(current, &value, anchor);
        for (target, translated) in self.spill_targets(current, &spill, anchor) {
            if !self.drawn(&target) {
                self.push_label(&target, &value, translated);
            }
        }
    }

    fn record_symbol(&mut self, current: &Tile, symbol: &SymbolContainer) {
        let spill = self.rect_spill(&symbol.boundary());
        if !spill.any() {
            return;
        }

        let anchor = symbol.point;
        self.push_symbol(current, &symbol.symbol, anchor);

        for (target, translated) in self.symbol_spill_targets(current, &spill, anchor) {
            if !self.drawn(&target) {
                self.push_symbol(&target, &symbol.symbol, translated);
            }
        }
    }

    /// Axial and corner targets for a spilling rectangle, with the anchor
    /// translated into each target's frame. Corner neighbors are touched only
    /// when both axial spills occur and neither axial neighbor is drawn.
    fn spill_targets(
        &self,
        current: &Tile,
        spill: &EdgeSpill,
        anchor: Point,
    ) -> Vec<(Tile, Point)> {
        let ts = self.tile_size;
        let mut targets = Vec::new();

        if spill.up {
            targets.push((current.above(), anchor.offset(0.0, ts)));
        }
        if spill.down {
            targets.push((current.below(), anchor.offset(0.0, -ts)));
        }
        if spill.left {
            targets.push((current.left(), anchor.offset(ts, 0.0)));
        }
        if spill.right {
            targets.push((current.right(), anchor.offset(-ts, 0.0)));
        }

        self.push_corner_targets(current, spill, anchor, &mut targets);
        targets
    }

    /// Like [`Self::spill_targets`], with the switchable routing applied to
    /// the bottom-edge case.
    fn symbol_spill_targets(
        &self,
        current: &Tile,
        spill: &EdgeSpill,
        anchor: Point,
    ) -> Vec<(Tile, Point)> {
        let ts = self.tile_size;
        let mut targets = Vec::new();

        if spill.up {
            targets.push((current.above(), anchor.offset(0.0, ts)));
        }
        if spill.down {
            let target = if self.symbol_bottom_spill_to_upper {
                current.above()
            } else {
                current.below()
            };
            targets.push((target, anchor.offset(0.0, -ts)));
        }
        if spill.left {
            targets.push((current.left(), anchor.offset(ts, 0.0)));
        }
        if spill.right {
            targets.push((current.right(), anchor.offset(-ts, 0.0)));
        }

        self.push_corner_targets(current, spill, anchor, &mut targets);
        targets
    }

    fn push_corner_targets(
        &self,
        current: &Tile,
        spill: &EdgeSpill,
        anchor: Point,
        targets: &mut Vec<(Tile, Point)>,
    ) {
        let ts = self.tile_size;
        let corner_allowed = |axial_a: &Tile, axial_b: &Tile| {
            !self.drawn(axial_a) && !self.drawn(axial_b)
        };

        if spill.up && spill.left && corner_allowed(&current.above(), &current.left()) {
            targets.push((current.above_left(), anchor.offset(ts, ts)));
        }
        if spill.up && spill.right && corner_allowed(&current.above(), &current.right()) {
            targets.push((current.above_right(), anchor.offset(-ts, ts)));
        }
        if spill.down && spill.left && corner_allowed(&current.below(), &current.left()) {
            targets.push((current.below_left(), anchor.offset(ts, -ts)));
        }
        if spill.down && spill.right && corner_allowed(&current.below(), &current.right()) {
            targets.push((current.below_right(), anchor.offset(-ts, -ts)));
        }
    }

    fn push_label(&mut self, tile: &Tile, value: &Arc<DependencyText>, point: Point) {
        let record = self.dependency_table.entry(tile.clone()).or_default();
        record
            .labels
            .push(Dependency::new(Arc::clone(value), point));
    }

    fn push_symbol(&mut self, tile: &Tile, bitmap: &Arc<Bitmap>, point: Point) {
        let record = self.dependency_table.entry(tile.clone()).or_default();
        record
            .symbols
            .push(Dependency::new(Arc::clone(bitmap), point));
    }

    fn current_record(&self) -> Option<&DependencyOnTile> {
        self.current_tile
            .as_ref()
            .and_then(|tile| self.dependency_table.get(tile))
    }

    fn neighbor_state(&self) -> Option<NeighborState> {
        let tile = self.current_tile.as_ref()?;
        Some(NeighborState {
            up: self.drawn(&tile.above()),
            down: self.drawn(&tile.below()),
            left: self.drawn(&tile.left()),
            right: self.drawn(&tile.right()),
        })
    }

    fn rect_spill(&self, boundary: &Rectangle) -> EdgeSpill {
        EdgeSpill {
            up: boundary.top < 0.0,
            down: boundary.bottom > self.tile_size,
            left: boundary.left < 0.0,
            right: boundary.right > self.tile_size,
        }
    }

    fn crosses_drawn_edge(&self, boundary: &Rectangle, neighbors: &NeighborState) -> bool {
        let spill = self.rect_spill(boundary);
        (spill.up && neighbors.up)
            || (spill.down && neighbors.down)
            || (spill.left && neighbors.left)
            || (spill.right && neighbors.right)
    }
}

impl Default for DependencyCache {
    fn default() -> Self {
        Self::new()
    }
}
