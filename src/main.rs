use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use minifb::{Key, Window, WindowOptions};
use tracing::info;

use maprender::{
    Bitmap, DatabaseRenderer, FileSystemTileCache, JobQueue, MapFile, MapWorker,
    MercatorProjection, RenderJob, RenderTheme, Tile,
};

const WINDOW_WIDTH: usize = 800;
const WINDOW_HEIGHT: usize = 600;
const TILE_SIZE: i32 = 256;
const TILE_CACHE_CAPACITY: usize = 256;
const TEXT_SCALE: f32 = 1.0;

struct Viewer {
    window: Window,
    buffer: Vec<u32>,
    center_lat: f64,
    center_lon: f64,
    zoom: u8,
    theme: Arc<RenderTheme>,
    map_file_path: PathBuf,
    queue: Arc<JobQueue<RenderJob>>,
    worker: MapWorker,
    delivered: mpsc::Receiver<(RenderJob, Bitmap)>,
    tiles: HashMap<Tile, Vec<u32>>,
}

impl Viewer {
    fn new(map_file_path: PathBuf) -> Result<Self, String> {
        let mut window = Window::new(
            "maprender",
            WINDOW_WIDTH,
            WINDOW_HEIGHT,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .map_err(|err| err.to_string())?;
        window.limit_update_rate(Some(Duration::from_micros(16600)));

        let map_file = MapFile::new(&map_file_path)
            .map_err(|err| format!("failed to open map file: {}", err))?;
        let start_position = map_file
            .start_position()
            .map_err(|err| err.to_string())?;
        let zoom = map_file.start_zoom_level();
        info!(
            latitude = start_position.latitude,
            longitude = start_position.longitude,
            zoom,
            "opened map file"
        );

        let theme = Arc::new(RenderTheme::built_in());
        let queue = Arc::new(JobQueue::new());
        let cache_directory = std::env::temp_dir().join("maprender-tiles");
        let cache = Arc::new(FileSystemTileCache::new(
            TILE_CACHE_CAPACITY,
            cache_directory,
        ));

        let (sender, delivered) = mpsc::channel();
        let renderer = DatabaseRenderer::new(map_file);
        let worker = MapWorker::start(renderer, Arc::clone(&queue), cache, sender);

        Ok(Self {
            window,
            buffer: vec![0; WINDOW_WIDTH * WINDOW_HEIGHT],
            center_lat: start_position.latitude,
            center_lon: start_position.longitude,
            zoom,
            theme,
            map_file_path,
            queue,
            worker,
            delivered,
            tiles: HashMap::new(),
        })
    }

    fn handle_input(&mut self) {
        let pan_factor = 180.0 / (1u64 << self.zoom) as f64 / 4.0;

        if self.window.is_key_down(Key::Left) {
            self.center_lon -= pan_factor;
        }
        if self.window.is_key_down(Key::Right) {
            self.center_lon += pan_factor;
        }
        if self.window.is_key_down(Key::Up) {
            self.center_lat += pan_factor;
        }
        if self.window.is_key_down(Key::Down) {
            self.center_lat -= pan_factor;
        }

        if self.window.is_key_pressed(Key::Equal, minifb::KeyRepeat::No) && self.zoom < 18 {
            self.zoom += 1;
        }
        if self.window.is_key_pressed(Key::Minus, minifb::KeyRepeat::No) && self.zoom > 1 {
            self.zoom -= 1;
        }
    }

    fn drain_finished_tiles(&mut self) {
        while let Ok((job, bitmap)) = self.delivered.try_recv() {
            self.tiles.insert(job.tile, bitmap.pixels().to_vec());
        }
    }

    fn schedule_and_compose(&mut self) {
        let center_px =
            MercatorProjection::longitude_to_pixel_x(self.center_lon, self.zoom, TILE_SIZE);
        let center_py =
            MercatorProjection::latitude_to_pixel_y(self.center_lat, self.zoom, TILE_SIZE);
        let origin_x = center_px - WINDOW_WIDTH as f64 / 2.0;
        let origin_y = center_py - WINDOW_HEIGHT as f64 / 2.0;

        self.buffer.fill(0x00e0e0e0);

        let first_tile_x = (origin_x / TILE_SIZE as f64).floor() as i64;
        let first_tile_y = (origin_y / TILE_SIZE as f64).floor() as i64;
        let tiles_across = WINDOW_WIDTH as i64 / TILE_SIZE as i64 + 2;
        let tiles_down = WINDOW_HEIGHT as i64 / TILE_SIZE as i64 + 2;

        for tile_y in first_tile_y..first_tile_y + tiles_down {
            for tile_x in first_tile_x..first_tile_x + tiles_across {
                let tile = Tile::new(tile_x, tile_y, self.zoom, TILE_SIZE);
                if !tile.is_in_bounds() {
                    continue;
                }

                if let Some(pixels) = self.tiles.get(&tile) {
                    let screen_x = (tile_x * TILE_SIZE as i64) as f64 - origin_x;
                    let screen_y = (tile_y * TILE_SIZE as i64) as f64 - origin_y;
                    blit_tile(&mut self.buffer, pixels, screen_x as i64, screen_y as i64);
                } else if let Ok(job) = RenderJob::new(
                    tile,
                    self.map_file_path.clone(),
                    Arc::clone(&self.theme),
                    TEXT_SCALE,
                ) {
                    self.queue.add(job);
                }
            }
        }
    }

    fn run(mut self) -> Result<(), String> {
        while self.window.is_open() && !self.window.is_key_down(Key::Escape) {
            self.handle_input();
            self.drain_finished_tiles();
            self.schedule_and_compose();
            self.window
                .update_with_buffer(&self.buffer, WINDOW_WIDTH, WINDOW_HEIGHT)
                .map_err(|err| err.to_string())?;
        }
        self.worker.stop();
        Ok(())
    }
}

fn blit_tile(buffer: &mut [u32], pixels: &[u32], screen_x: i64, screen_y: i64) {
    for row in 0..TILE_SIZE as i64 {
        let target_y = screen_y + row;
        if target_y < 0 || target_y >= WINDOW_HEIGHT as i64 {
            continue;
        }
        for column in 0..TILE_SIZE as i64 {
            let target_x = screen_x + column;
            if target_x < 0 || target_x >= WINDOW_WIDTH as i64 {
                continue;
            }
            buffer[(target_y as usize) * WINDOW_WIDTH + target_x as usize] =
                pixels[(row * TILE_SIZE as i64 + column) as usize];
        }
    }
}

fn main() -> Result<(), String> {
    tracing_subscriber::fmt::init();

    let map_file_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| "usage: maprender <file.map>".to_string())?;

    Viewer::new(map_file_path)?.run()
}
