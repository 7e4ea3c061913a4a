use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use tracing::debug;

use crate::dependency_cache::DependencyCache;
use crate::render_elements::{PointTextContainer, Rectangle, SymbolContainer};
use crate::tile::Tile;

// Gap between a symbol and the candidate positions generated around it.
const START_DISTANCE_TO_SYMBOLS: f64 = 4.0;
// Margins used when pruning candidates and removing mutual overlaps.
const LABEL_DISTANCE_TO_SYMBOL: f64 = 2.0;
const LABEL_DISTANCE_TO_LABEL: f64 = 2.0;
const SYMBOL_DISTANCE_TO_SYMBOL: f64 = 2.0;

/// Candidate anchor for a caption. `y` is the baseline the text would get;
/// the candidate's boundary spans `[x, x + width] x [y - height, y]`.
#[derive(Debug, Clone)]
pub struct ReferencePosition {
    pub x: f64,
    pub y: f64,
    pub node_index: usize,
    pub width: f64,
    pub height: f64,
}

impl ReferencePosition {
    pub fn boundary(&self) -> Rectangle {
        Rectangle::new(self.x, self.y - self.height, self.x + self.width, self.y)
    }
}

/// Ordering wrapper for the two candidate queues: primary key ascending,
/// ties broken by slot index (insertion order), which keeps placement
/// deterministic.
#[derive(Debug, PartialEq)]
struct QueueEntry {
    key: f64,
    slot: usize,
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .total_cmp(&other.key)
            .then(self.slot.cmp(&other.slot))
            .reverse() // BinaryHeap is a max-heap; we want the smallest key
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Resolves intra-tile label collisions and coordinates with neighbor tiles
/// through the shared [`DependencyCache`].
pub struct LabelPlacement {
    dependency_cache: DependencyCache,
}

impl LabelPlacement {
    pub fn new() -> Self {
        Self {
            dependency_cache: DependencyCache::new(),
        }
    }

    pub fn dependency_cache(&self) -> &DependencyCache {
        &self.dependency_cache
    }

    pub fn dependency_cache_mut(&mut self) -> &mut DependencyCache {
        &mut self.dependency_cache
    }

    /// Places `labels` around their anchors so that no two surviving items
    /// collide with each other, with the tile's own area labels and symbols,
    /// or with anything a drawn neighbor has already committed. Survivors are
    /// recorded in the dependency cache; `symbols` and `area_labels` are
    /// filtered in place and the placed labels are returned.
    pub fn place_labels(
        &mut self,
        mut labels: Vec<PointTextContainer>,
        symbols: &mut Vec<Arc<SymbolContainer>>,
        area_labels: &mut Vec<PointTextContainer>,
        current_tile: &Tile,
    ) -> Vec<PointTextContainer> {
        self.dependency_cache.set_current_tile(current_tile);
        let tile_size = current_tile.tile_size as f64;
        let tile_boundary = Rectangle::new(0.0, 0.0, tile_size, tile_size);

        self.prepare_area_labels(area_labels, &tile_boundary);
        self.prepare_labels(&mut labels, &tile_boundary);
        self.prepare_symbols(symbols, &tile_boundary);

        // A label whose symbol did not survive loses the reference.
        for label in labels.iter_mut() {
            if let Some(symbol) = &label.symbol {
                if !symbols.iter().any(|s| Arc::ptr_eq(s, symbol)) {
                    label.symbol = None;
                }
            }
        }

        Self::remove_symbols_under_area_labels(symbols, area_labels);

        self.dependency_cache
            .remove_overlapping(&mut labels, area_labels, symbols);

        let placed = self.process_four_point_greedy(&labels, symbols, area_labels);

        self.dependency_cache.record(&placed, symbols, area_labels);

        debug!(
            placed = placed.len(),
            symbols = symbols.len(),
            area_labels = area_labels.len(),
            "label placement finished"
        );
        placed
    }

    /// Area labels are centered on their anchor, clipped to the tile, thinned
    /// by mutual overlap and checked against drawn neighbors.
    fn prepare_area_labels(
        &self,
        area_labels: &mut Vec<PointTextContainer>,
        tile_boundary: &Rectangle,
    ) {
        for label in area_labels.iter_mut() {
            label.x -= label.width / 2.0;
        }
        area_labels.retain(|label| label.boundary().intersects(tile_boundary));

        Self::remove_mutual_overlaps(area_labels, LABEL_DISTANCE_TO_LABEL);

        self.dependency_cache
            .remove_out_of_drawn_areas_labels(area_labels);
    }

    fn prepare_labels(&self, labels: &mut Vec<PointTextContainer>, tile_boundary: &Rectangle) {
        // Anchors are still the raw POI positions, so the horizontal extent is
        // centered on the anchor here.
        labels.retain(|label| {
            let boundary = Rectangle::new(
                label.x - label.width / 2.0,
                label.y - label.height,
                label.x + label.width / 2.0,
                label.y,
            );
            boundary.intersects(tile_boundary)
        });
    }

    fn prepare_symbols(&self, symbols: &mut Vec<Arc<SymbolContainer>>, tile_boundary: &Rectangle) {
        symbols.retain(|symbol| symbol.boundary().intersects(tile_boundary));

        // Mutual overlap, keeping the earlier symbol.
        let mut index = 0;
        while index < symbols.len() {
            let boundary = symbols[index].boundary().inflate(SYMBOL_DISTANCE_TO_SYMBOL);
            let mut other = index + 1;
            while other < symbols.len() {
                if symbols[other].boundary().intersects(&boundary) {
                    symbols.remove(other);
                } else {
                    other += 1;
                }
            }
            index += 1;
        }

        self.dependency_cache
            .remove_out_of_drawn_areas_symbols(symbols);
    }

    fn remove_mutual_overlaps(labels: &mut Vec<PointTextContainer>, inflation: f64) {
        let mut index = 0;
        while index < labels.len() {
            let boundary = labels[index].boundary().inflate(inflation);
            let mut other = index + 1;
            while other < labels.len() {
                if labels[other].boundary().intersects(&boundary) {
                    labels.remove(other);
                } else {
                    other += 1;
                }
            }
            index += 1;
        }
    }

    fn remove_symbols_under_area_labels(
        symbols: &mut Vec<Arc<SymbolContainer>>,
        area_labels: &[PointTextContainer],
    ) {
        symbols.retain(|symbol| {
            let boundary = symbol.boundary();
            !area_labels.iter().any(|label| {
                label
                    .boundary()
                    .inflate(LABEL_DISTANCE_TO_SYMBOL)
                    .intersects(&boundary)
            })
        });
    }

    /// Greedy selection over four candidate positions per caption. Two
    /// priority queues sweep the candidates by top and bottom edge; accepted
    /// candidates evict everything they collide with.
    fn process_four_point_greedy(
        &mut self,
        labels: &[PointTextContainer],
        symbols: &[Arc<SymbolContainer>],
        area_labels: &[PointTextContainer],
    ) -> Vec<PointTextContainer> {
        let mut refs = self.generate_reference_positions(labels);

        self.prune_candidates(&mut refs, symbols, area_labels);
        self.dependency_cache
            .remove_out_of_tile_reference_points(&mut refs);
        self.dependency_cache
            .remove_overlapping_reference_points(&mut refs);

        let mut priority_up = BinaryHeap::new();
        let mut priority_down = BinaryHeap::new();
        for (slot, candidate) in refs.iter().enumerate() {
            if let Some(reference) = candidate {
                priority_up.push(QueueEntry {
                    key: reference.y - reference.height,
                    slot,
                });
                priority_down.push(QueueEntry {
                    key: reference.y,
                    slot,
                });
            }
        }

        let mut removed = vec![false; refs.len()];
        let mut resolution = Vec::new();

        while let Some(accepted_slot) = Self::pop_live(&mut priority_up, &removed) {
            let Some(accepted) = refs[accepted_slot].clone() else {
                continue;
            };

            let label = &labels[accepted.node_index];
            let mut placed = label.clone();
            placed.x = accepted.x;
            placed.y = accepted.y;
            resolution.push(placed);

            // All candidates of the accepted caption leave both queues.
            for slot in accepted.node_index * 4..accepted.node_index * 4 + 4 {
                if slot < removed.len() {
                    removed[slot] = true;
                }
            }

            // Sweep: everything in the bottom queue left of the accepted
            // label's right edge is either evicted (vertical overlap) or
            // re-enqueued untouched.
            let mut drained = Vec::new();
            while let Some(front_slot) = priority_down.peek().map(|entry| entry.slot) {
                if removed[front_slot] || refs[front_slot].is_none() {
                    priority_down.pop();
                    continue;
                }
                let within_sweep = refs[front_slot]
                    .as_ref()
                    .map_or(false, |candidate| candidate.x < accepted.x + accepted.width);
                if within_sweep {
                    drained.push(front_slot);
                    priority_down.pop();
                } else {
                    break;
                }
            }

            for slot in drained {
                let candidate = match &refs[slot] {
                    Some(candidate) => candidate,
                    None => continue,
                };
                let collides = candidate.x <= accepted.x + accepted.width
                    && candidate.y >= accepted.y - candidate.height
                    && candidate.y <= accepted.y + candidate.height;
                if collides {
                    removed[slot] = true;
                } else {
                    priority_down.push(QueueEntry {
                        key: candidate.y,
                        slot,
                    });
                }
            }
        }

        resolution
    }

    /// Four positions around the symbol at a fixed gap, or a single centered
    /// position when the caption has no symbol.
    fn generate_reference_positions(
        &self,
        labels: &[PointTextContainer],
    ) -> Vec<Option<ReferencePosition>> {
        let mut refs = vec![None; labels.len() * 4];

        for (node_index, label) in labels.iter().enumerate() {
            let (width, height) = (label.width, label.height);
            match &label.symbol {
                Some(symbol) => {
                    let half_symbol_width = symbol.width() / 2.0;
                    let half_symbol_height = symbol.height() / 2.0;

                    // Above the symbol.
                    refs[node_index * 4] = Some(ReferencePosition {
                        x: label.x - width / 2.0,
                        y: label.y - half_symbol_height - START_DISTANCE_TO_SYMBOLS,
                        node_index,
                        width,
                        height,
                    });
                    // Below.
                    refs[node_index * 4 + 1] = Some(ReferencePosition {
                        x: label.x - width / 2.0,
                        y: label.y + half_symbol_height + START_DISTANCE_TO_SYMBOLS + height,
                        node_index,
                        width,
                        height,
                    });
                    // Left.
                    refs[node_index * 4 + 2] = Some(ReferencePosition {
                        x: label.x - half_symbol_width - START_DISTANCE_TO_SYMBOLS - width,
                        y: label.y + height / 2.0,
                        node_index,
                        width,
                        height,
                    });
                    // Right.
                    refs[node_index * 4 + 3] = Some(ReferencePosition {
                        x: label.x + half_symbol_width + START_DISTANCE_TO_SYMBOLS,
                        y: label.y + height / 2.0,
                        node_index,
                        width,
                        height,
                    });
                }
                None => {
                    refs[node_index * 4] = Some(ReferencePosition {
                        x: label.x - width / 2.0,
                        y: label.y,
                        node_index,
                        width,
                        height,
                    });
                }
            }
        }

        refs
    }

    fn prune_candidates(
        &self,
        refs: &mut [Option<ReferencePosition>],
        symbols: &[Arc<SymbolContainer>],
        area_labels: &[PointTextContainer],
    ) {
        for slot in refs.iter_mut() {
            let conflicting = slot.as_ref().map_or(false, |reference| {
                let boundary = reference.boundary();
                symbols.iter().any(|symbol| {
                    symbol
                        .boundary()
                        .inflate(LABEL_DISTANCE_TO_SYMBOL)
                        .intersects(&boundary)
                }) || area_labels.iter().any(|label| {
                    label
                        .boundary()
                        .inflate(LABEL_DISTANCE_TO_SYMBOL)
                        .intersects(&boundary)
                })
            });
            if conflicting {
                *slot = None;
            }
        }
    }

    fn pop_live(queue: &mut BinaryHeap<QueueEntry>, removed: &[bool]) -> Option<usize> {
        while let Some(entry) = queue.pop() {
            if !removed[entry.slot] {
                return Some(entry.slot);
            }
        }
        None
    }
}

impl Default for LabelPlacement {
    fn default() -> Self {
        Self::new()
    }
}
