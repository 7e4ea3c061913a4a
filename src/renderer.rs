use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::errors::{MapRenderError, Result};
use crate::graphics::{Bitmap, Canvas, Paint, Style};
use crate::label_placement::LabelPlacement;
use crate::map_file::MapFile;
use crate::mercator::MercatorProjection;
use crate::render_elements::{Point, PointTextContainer, SymbolContainer, WayTextContainer};
use crate::theme::{RenderCallback, RenderTheme};
use crate::tile::Tile;
use crate::way_decorator;

/// Number of drawing layers a map element can sort into.
pub const LAYERS: usize = 11;

const STROKE_INCREASE: f64 = 1.5;
const STROKE_MIN_ZOOM_LEVEL: u8 = 12;

/// One tile rendering request. Equality and hashing go by tile, map file and
/// text scale (by raw bit pattern), which is what the tile cache keys on.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub tile: Tile,
    pub map_file_path: PathBuf,
    pub theme: Arc<RenderTheme>,
    pub text_scale: f32,
}

impl RenderJob {
    pub fn new(
        tile: Tile,
        map_file_path: PathBuf,
        theme: Arc<RenderTheme>,
        text_scale: f32,
    ) -> Result<Self> {
        if !(text_scale > 0.0) {
            return Err(MapRenderError::InvalidArgument(format!(
                "text scale must be positive: {}",
                text_scale
            )));
        }
        if map_file_path.as_os_str().is_empty() {
            return Err(MapRenderError::InvalidArgument(
                "map file path must not be empty".to_string(),
            ));
        }
        Ok(Self {
            tile,
            map_file_path,
            theme,
            text_scale,
        })
    }
}

impl PartialEq for RenderJob {
    fn eq(&self, other: &Self) -> bool {
        self.tile == other.tile
            && self.map_file_path == other.map_file_path
            && self.text_scale.to_bits() == other.text_scale.to_bits()
    }
}

impl Eq for RenderJob {}

impl Hash for RenderJob {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tile.hash(state);
        self.map_file_path.hash(state);
        self.text_scale.to_bits().hash(state);
    }
}

/// Either a projected way outline or a circle, waiting in a bucket with the
/// paint it will be drawn with.
enum ShapeContainer {
    Way(Arc<Vec<Vec<(f64, f64)>>>),
    Circle { x: f64, y: f64, radius: f32 },
}

struct ShapePaintContainer {
    shape: ShapeContainer,
    paint: Paint,
}

/// Per-job state the theme callbacks write into: the layer/level buckets for
/// shapes and the collected captions, symbols and way names. Reused across
/// jobs by clearing in place.
pub struct RenderContext {
    levels: usize,
    ways: Vec<Vec<Vec<ShapePaintContainer>>>,
    labels: Vec<PointTextContainer>,
    area_labels: Vec<PointTextContainer>,
    point_symbols: Vec<Arc<SymbolContainer>>,
    way_symbols: Vec<SymbolContainer>,
    way_names: Vec<WayTextContainer>,

    // Transient state for the element currently being matched.
    current_layer: usize,
    coordinates: Arc<Vec<Vec<(f64, f64)>>>,
    label_position: Point,
    poi_position: Point,
    current_symbol: Option<Arc<SymbolContainer>>,
}

impl RenderContext {
    fn new(levels: usize) -> Self {
        let mut context = Self {
            levels: 0,
            ways: Vec::new(),
            labels: Vec::new(),
            area_labels: Vec::new(),
            point_symbols: Vec::new(),
            way_symbols: Vec::new(),
            way_names: Vec::new(),
            current_layer: 0,
            coordinates: Arc::new(Vec::new()),
            label_position: Point::new(0.0, 0.0),
            poi_position: Point::new(0.0, 0.0),
            current_symbol: None,
        };
        context.rebuild(levels);
        context
    }

    fn rebuild(&mut self, levels: usize) {
        self.levels = levels;
        self.ways = (0..LAYERS)
            .map(|_| (0..levels).map(|_| Vec::new()).collect())
            .collect();
        self.clear_collected();
    }

    fn clear(&mut self) {
        for layer in &mut self.ways {
            for level in layer {
                level.clear();
            }
        }
        self.clear_collected();
    }

    fn clear_collected(&mut self) {
        self.labels.clear();
        self.area_labels.clear();
        self.point_symbols.clear();
        self.way_symbols.clear();
        self.way_names.clear();
        self.current_symbol = None;
    }

    fn set_current_way(
        &mut self,
        layer: i8,
        coordinates: Arc<Vec<Vec<(f64, f64)>>>,
        label_position: Point,
    ) {
        self.current_layer = (layer.max(0) as usize).min(LAYERS - 1);
        self.coordinates = coordinates;
        self.label_position = label_position;
        self.current_symbol = None;
    }

    fn set_current_poi(&mut self, layer: i8, position: Point) {
        self.current_layer = (layer.max(0) as usize).min(LAYERS - 1);
        self.poi_position = position;
        self.current_symbol = None;
    }

    fn add_shape(&mut self, shape: ShapeContainer, paint: Paint, level: usize) {
        let level = level.min(self.levels.saturating_sub(1));
        self.ways[self.current_layer][level].push(ShapePaintContainer { shape, paint });
    }
}

impl RenderCallback for RenderContext {
    fn render_area(&mut self, fill: Option<&Paint>, stroke: Option<&Paint>, level: usize) {
        if let Some(fill) = fill {
            self.add_shape(
                ShapeContainer::Way(Arc::clone(&self.coordinates)),
                fill.clone(),
                level,
            );
        }
        if let Some(stroke) = stroke {
            self.add_shape(
                ShapeContainer::Way(Arc::clone(&self.coordinates)),
                stroke.clone(),
                level,
            );
        }
    }

    fn render_area_caption(
        &mut self,
        text: &str,
        vertical_offset: f32,
        fill: &Paint,
        stroke: Option<&Paint>,
    ) {
        self.area_labels.push(PointTextContainer::new(
            text,
            self.label_position.x,
            self.label_position.y + vertical_offset as f64,
            fill.clone(),
            stroke.cloned(),
        ));
    }

    fn render_area_symbol(&mut self, symbol: &Arc<Bitmap>) {
        let point = Point::new(
            self.label_position.x - symbol.width() as f64 / 2.0,
            self.label_position.y - symbol.height() as f64 / 2.0,
        );
        self.point_symbols
            .push(Arc::new(SymbolContainer::new(Arc::clone(symbol), point)));
    }

    fn render_point_of_interest_caption(
        &mut self,
        text: &str,
        vertical_offset: f32,
        fill: &Paint,
        stroke: Option<&Paint>,
    ) {
        let mut label = PointTextContainer::new(
            text,
            self.poi_position.x,
            self.poi_position.y + vertical_offset as f64,
            fill.clone(),
            stroke.cloned(),
        );
        if let Some(symbol) = &self.current_symbol {
            label = label.with_symbol(Arc::clone(symbol));
        }
        self.labels.push(label);
    }

    fn render_point_of_interest_circle(
        &mut self,
        radius: f32,
        fill: Option<&Paint>,
        stroke: Option<&Paint>,
        level: usize,
    ) {
        let (x, y) = (self.poi_position.x, self.poi_position.y);
        if let Some(fill) = fill {
            self.add_shape(ShapeContainer::Circle { x, y, radius }, fill.clone(), level);
        }
        if let Some(stroke) = stroke {
            self.add_shape(
                ShapeContainer::Circle { x, y, radius },
                stroke.clone(),
                level,
            );
        }
    }

    fn render_point_of_interest_symbol(&mut self, symbol: &Arc<Bitmap>) {
        let point = Point::new(
            self.poi_position.x - symbol.width() as f64 / 2.0,
            self.poi_position.y - symbol.height() as f64 / 2.0,
        );
        let container = Arc::new(SymbolContainer::new(Arc::clone(symbol), point));
        self.current_symbol = Some(Arc::clone(&container));
        self.point_symbols.push(container);
    }

    fn render_way(&mut self, stroke: &Paint, level: usize) {
        self.add_shape(
            ShapeContainer::Way(Arc::clone(&self.coordinates)),
            stroke.clone(),
            level,
        );
    }

    fn render_way_symbol(&mut self, symbol: &Arc<Bitmap>, align_center: bool, repeat: bool) {
        let coordinates = Arc::clone(&self.coordinates);
        if let Some(block) = coordinates.first() {
            way_decorator::render_symbol(symbol, align_center, repeat, block, &mut self.way_symbols);
        }
    }

    fn render_way_text(&mut self, text: &str, fill: &Paint, stroke: Option<&Paint>) {
        let coordinates = Arc::clone(&self.coordinates);
        if let Some(block) = coordinates.first() {
            way_decorator::render_text(text, fill, stroke, block, &mut self.way_names);
        }
    }
}

/// Drives one full tile render: read geometry, dispatch it through the
/// theme, place labels against the dependency cache, rasterize in fixed
/// z-order.
pub struct DatabaseRenderer {
    map_file: MapFile,
    label_placement: LabelPlacement,
    context: RenderContext,
    previous_theme: Option<Arc<RenderTheme>>,
    previous_zoom: Option<u8>,
    stroke_scale: f32,
    text_scale: f32,
}

impl DatabaseRenderer {
    pub fn new(map_file: MapFile) -> Self {
        Self {
            map_file,
            label_placement: LabelPlacement::new(),
            context: RenderContext::new(1),
            previous_theme: None,
            previous_zoom: None,
            stroke_scale: 1.0,
            text_scale: 1.0,
        }
    }

    pub fn label_placement_mut(&mut self) -> &mut LabelPlacement {
        &mut self.label_placement
    }

    pub fn execute_job(&mut self, job: &RenderJob) -> Result<Bitmap> {
        let tile = &job.tile;
        let zoom_level = tile.zoom_level;

        match &self.previous_theme {
            Some(previous) if Arc::ptr_eq(previous, &job.theme) => self.context.clear(),
            _ => {
                self.context.rebuild(job.theme.levels());
                self.previous_theme = Some(Arc::clone(&job.theme));
            }
        }

        if self.previous_zoom != Some(zoom_level) {
            self.stroke_scale = STROKE_INCREASE
                .powi(zoom_level.saturating_sub(STROKE_MIN_ZOOM_LEVEL) as i32)
                as f32;
            self.previous_zoom = Some(zoom_level);
        }
        self.text_scale = job.text_scale;

        let read_result = self.map_file.read_map_data(tile)?;

        for bundle in &read_result.poi_way_bundles {
            for poi in &bundle.pois {
                let position = project(poi.position.latitude, poi.position.longitude, tile);
                self.context.set_current_poi(poi.layer, position);
                job.theme.match_poi(
                    &mut self.context,
                    &poi.tags,
                    zoom_level,
                    self.stroke_scale,
                    self.text_scale,
                );
            }

            for way in &bundle.ways {
                let blocks: Vec<Vec<(f64, f64)>> = way
                    .way_nodes
                    .iter()
                    .map(|block| {
                        block
                            .iter()
                            .map(|node| {
                                let point = project(node.latitude, node.longitude, tile);
                                (point.x, point.y)
                            })
                            .collect()
                    })
                    .collect();
                if blocks.is_empty() || blocks[0].len() < 2 {
                    continue;
                }

                let closed = blocks[0].first() == blocks[0].last();
                let label_position = match &way.label_position {
                    Some(position) => project(position.latitude, position.longitude, tile),
                    None => centroid(&blocks[0]),
                };
                self.context
                    .set_current_way(way.layer, Arc::new(blocks), label_position);
                job.theme.match_way(
                    &mut self.context,
                    &way.tags,
                    zoom_level,
                    closed,
                    self.stroke_scale,
                    self.text_scale,
                );
            }
        }

        let mut symbols = std::mem::take(&mut self.context.point_symbols);
        let mut area_labels = std::mem::take(&mut self.context.area_labels);
        let labels = self.label_placement.place_labels(
            std::mem::take(&mut self.context.labels),
            &mut symbols,
            &mut area_labels,
            tile,
        );

        debug!(
            tile_x = tile.tile_x,
            tile_y = tile.tile_y,
            zoom = zoom_level,
            labels = labels.len(),
            "rendering tile"
        );

        let mut canvas = Canvas::new(tile.tile_size, tile.tile_size);
        if read_result.is_water {
            canvas.fill_color(job.theme.water_background());
        } else {
            canvas.fill_color(job.theme.background());
        }

        self.draw_ways(&mut canvas);
        for symbol in &self.context.way_symbols {
            draw_symbol(&mut canvas, symbol);
        }
        for symbol in &symbols {
            draw_symbol(&mut canvas, symbol);
        }
        for way_name in &self.context.way_names {
            draw_way_name(&mut canvas, way_name);
        }
        for label in &labels {
            canvas.draw_text(
                &label.text,
                label.x,
                label.y,
                &label.paint_front,
                label.paint_back.as_ref(),
            );
        }
        for label in &area_labels {
            canvas.draw_text(
                &label.text,
                label.x,
                label.y,
                &label.paint_front,
                label.paint_back.as_ref(),
            );
        }

        Ok(canvas.into_bitmap())
    }

    fn draw_ways(&self, canvas: &mut Canvas) {
        for layer in &self.context.ways {
            for level in layer {
                for container in level {
                    match &container.shape {
                        ShapeContainer::Way(blocks) => {
                            for block in blocks.iter() {
                                if container.paint.style == Style::Fill {
                                    canvas.fill_polygon(block, &container.paint);
                                } else {
                                    canvas.draw_polyline(block, &container.paint);
                                }
                            }
                        }
                        ShapeContainer::Circle { x, y, radius } => {
                            if container.paint.style == Style::Fill {
                                canvas.fill_circle(*x, *y, *radius as f64, &container.paint);
                            } else {
                                canvas.draw_circle(*x, *y, *radius as f64, &container.paint);
                            }
                        }
                    }
                }
            }
        }
    }
}

fn project(latitude: f64, longitude: f64, tile: &Tile) -> Point {
    let tile_size = tile.tile_size;
    let x = MercatorProjection::longitude_to_pixel_x(longitude, tile.zoom_level, tile_size)
        - (tile.tile_x * tile_size as i64) as f64;
    let y = MercatorProjection::latitude_to_pixel_y(latitude, tile.zoom_level, tile_size)
        - (tile.tile_y * tile_size as i64) as f64;
    Point::new(x, y)
}

fn centroid(block: &[(f64, f64)]) -> Point {
    if block.is_empty() {
        return Point::new(0.0, 0.0);
    }
    let (sum_x, sum_y) = block
        .iter()
        .fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
    Point::new(sum_x / block.len() as f64, sum_y / block.len() as f64)
}

fn draw_symbol(canvas: &mut Canvas, symbol: &SymbolContainer) {
    let (x, y) = if symbol.align_center {
        (
            symbol.point.x - symbol.width() / 2.0,
            symbol.point.y - symbol.height() / 2.0,
        )
    } else {
        (symbol.point.x, symbol.point.y)
    };
    canvas.draw_bitmap(&symbol.symbol, x, y, symbol.rotation);
}

fn draw_way_name(canvas: &mut Canvas, way_name: &WayTextContainer) {
    let width = way_name.paint.get_text_width(&way_name.text);
    let x = (way_name.x1 + way_name.x2) / 2.0 - width / 2.0;
    let y = (way_name.y1 + way_name.y2) / 2.0 + way_name.paint.get_text_height() / 2.0;
    canvas.draw_text(&way_name.text, x, y, &way_name.paint, None);
}
