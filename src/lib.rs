mod dependency_cache;
mod deserializer;
mod errors;
mod graphics;
mod header;
mod index_cache;
mod job_queue;
mod label_placement;
mod map_data;
pub mod map_file;
mod map_worker;
mod mercator;
mod optional_field;
mod query_calculations;
mod query_parameters;
mod reader;
mod render_elements;
mod renderer;
mod required_field;
mod theme;
mod tile;
mod tile_cache;
mod types;
mod way_decorator;

pub use dependency_cache::{Dependency, DependencyCache, DependencyOnTile, DependencyText};
pub use deserializer::Deserializer;
pub use errors::{MapRenderError, Result};
pub use graphics::{Bitmap, Canvas, Paint, Style};
pub use header::{MapFileHeader, MapFileInfo, SubFileParameter};
pub use job_queue::{JobQueue, JOB_QUEUE_CAPACITY};
pub use label_placement::{LabelPlacement, ReferencePosition};
pub use map_data::{MapReadResult, PoiWayBundle, PointOfInterest, Way};
pub use map_file::{MapFile, Selector};
pub use map_worker::MapWorker;
pub use mercator::MercatorProjection;
pub use render_elements::{Point, PointTextContainer, Rectangle, SymbolContainer, WayTextContainer};
pub use renderer::{DatabaseRenderer, RenderJob, LAYERS};
pub use theme::{RenderCallback, RenderTheme};
pub use tile::Tile;
pub use tile_cache::FileSystemTileCache;
pub use types::{BoundingBox, LatLong, Tag};
