use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::graphics::Bitmap;
use crate::job_queue::JobQueue;
use crate::renderer::{DatabaseRenderer, RenderJob};
use crate::tile_cache::FileSystemTileCache;

const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One rendering worker per tile layer. The worker owns its renderer (and
/// with it the dependency cache) and drives one job through the whole
/// pipeline before taking the next. Pause and stop are only honored between
/// jobs; a started tile always runs to completion.
pub struct MapWorker {
    handle: Option<JoinHandle<()>>,
    paused: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
    queue: Arc<JobQueue<RenderJob>>,
}

impl MapWorker {
    pub fn start(
        mut renderer: DatabaseRenderer,
        queue: Arc<JobQueue<RenderJob>>,
        cache: Arc<FileSystemTileCache>,
        delivery: Sender<(RenderJob, Bitmap)>,
    ) -> Self {
        let paused = Arc::new(AtomicBool::new(false));
        let stopped = Arc::new(AtomicBool::new(false));

        let worker_paused = Arc::clone(&paused);
        let worker_stopped = Arc::clone(&stopped);
        let worker_queue = Arc::clone(&queue);

        let handle = thread::spawn(move || loop {
            if worker_stopped.load(Ordering::Acquire) {
                break;
            }
            if worker_paused.load(Ordering::Acquire) {
                thread::sleep(PAUSE_POLL_INTERVAL);
                continue;
            }

            let Some(job) = worker_queue.remove() else {
                break;
            };

            if cache.contains_key(&job) {
                debug!(
                    tile_x = job.tile.tile_x,
                    tile_y = job.tile.tile_y,
                    "tile already cached, skipping"
                );
                continue;
            }

            match renderer.execute_job(&job) {
                Ok(bitmap) => {
                    cache.put(&job, &bitmap);
                    if delivery.send((job, bitmap)).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(
                        tile_x = job.tile.tile_x,
                        tile_y = job.tile.tile_y,
                        zoom = job.tile.zoom_level,
                        %err,
                        "tile discarded"
                    );
                }
            }
        });

        Self {
            handle: Some(handle),
            paused,
            stopped,
            queue,
        }
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    pub fn proceed(&self) {
        self.paused.store(false, Ordering::Release);
    }

    pub fn stop(&mut self) {
        self.stopped.store(true, Ordering::Release);
        self.queue.close();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MapWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
