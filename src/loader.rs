//! Background model loading (native only) and the loading overlay.
//!
//! [`ModelLoader`] reads and decodes the model on a worker thread so the
//! event loop keeps running. Cancelling a load guarantees its model is never
//! handed out: a result that races the cancel is replaced by
//! [`LoadError::Cancelled`] on the receiving side.
//!
//! [`LoadOverlay`] is the view of the load the user sees. It clears itself
//! once the configured timeout has elapsed, whatever the load is doing.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use web_time::Instant;

use crate::model::{LoadError, ModelScene};

/// Read granularity; progress is reported once per chunk.
const READ_CHUNK: usize = 256 * 1024;

/// Message from the loader thread.
#[derive(Debug)]
pub enum LoadEvent {
    /// Fraction of the file read so far, `0.0..=1.0`.
    Progress(f32),
    Finished(Result<ModelScene, LoadError>),
}

/// Read and decode a model file, checking `cancel` between steps.
pub fn load_model(
    path: &Path,
    cancel: &AtomicBool,
    mut progress: impl FnMut(f32),
) -> Result<ModelScene, LoadError> {
    let mut file = std::fs::File::open(path)?;
    let total = file.metadata().map(|m| m.len() as usize).unwrap_or(0);
    let mut bytes = Vec::with_capacity(total);
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        if cancel.load(Ordering::Acquire) {
            return Err(LoadError::Cancelled);
        }
        let n = file.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..n]);
        if total > 0 {
            progress((bytes.len() as f32 / total as f32).min(1.0));
        }
    }
    progress(1.0);

    if cancel.load(Ordering::Acquire) {
        return Err(LoadError::Cancelled);
    }
    let scene = ModelScene::from_glb(&bytes)?;
    if cancel.load(Ordering::Acquire) {
        return Err(LoadError::Cancelled);
    }
    Ok(scene)
}

/// Loads one model on a background thread.
pub struct ModelLoader {
    path: PathBuf,
    /// Receiver for events from the background thread
    event_rx: Receiver<LoadEvent>,
    cancel: Arc<AtomicBool>,
    /// Handle to the background thread (for joining on drop)
    thread_handle: Option<JoinHandle<()>>,
    finished: bool,
}

impl ModelLoader {
    /// Start loading `path`.
    pub fn spawn(path: PathBuf) -> Result<Self, LoadError> {
        let (event_tx, event_rx) = mpsc::channel::<LoadEvent>();
        let cancel = Arc::new(AtomicBool::new(false));

        let thread_path = path.clone();
        let thread_cancel = cancel.clone();
        let thread_handle = thread::Builder::new()
            .name("model-loader".to_string())
            .spawn(move || Self::thread_main(&thread_path, &thread_cancel, &event_tx))?;

        log::info!("Loading model from {:?}", path);

        Ok(Self {
            path,
            event_rx,
            cancel,
            thread_handle: Some(thread_handle),
            finished: false,
        })
    }

    fn thread_main(path: &Path, cancel: &AtomicBool, event_tx: &Sender<LoadEvent>) {
        let result = load_model(path, cancel, |fraction| {
            // The receiver may already be gone; progress is best effort
            let _ = event_tx.send(LoadEvent::Progress(fraction));
        });
        if event_tx.send(LoadEvent::Finished(result)).is_err() {
            log::debug!("Loader result dropped: receiver closed");
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Abandon the load. Any model decoded afterwards is dropped.
    pub fn cancel(&self) {
        if !self.cancel.swap(true, Ordering::AcqRel) {
            log::info!("Cancelled model load from {:?}", self.path);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Take one event. Non-blocking.
    pub fn poll(&mut self) -> Option<LoadEvent> {
        if self.finished {
            return None;
        }
        let event = match self.event_rx.try_recv() {
            Ok(event) => event,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Model loader thread disconnected");
                self.finished = true;
                return Some(LoadEvent::Finished(Err(LoadError::Cancelled)));
            }
        };
        Some(self.filter(event))
    }

    /// Block until the load finishes.
    pub fn wait(&mut self) -> Result<ModelScene, LoadError> {
        while !self.finished {
            let event = match self.event_rx.recv() {
                Ok(event) => self.filter(event),
                Err(_) => {
                    self.finished = true;
                    return Err(LoadError::Cancelled);
                }
            };
            if let LoadEvent::Finished(result) = event {
                return result;
            }
        }
        Err(LoadError::Cancelled)
    }

    fn filter(&mut self, event: LoadEvent) -> LoadEvent {
        match event {
            LoadEvent::Finished(result) => {
                self.finished = true;
                if self.is_cancelled() {
                    // Drop a model that raced the cancel
                    LoadEvent::Finished(Err(LoadError::Cancelled))
                } else {
                    LoadEvent::Finished(result)
                }
            }
            progress => progress,
        }
    }
}

impl Drop for ModelLoader {
    fn drop(&mut self) {
        self.cancel();
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                log::warn!("Model loader thread panicked: {:?}", e);
            }
        }
    }
}

// ============================================================================
// Loading Overlay
// ============================================================================

/// What the loading overlay shows.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Loading { progress: f32 },
    Loaded,
    Failed(String),
}

/// Loading overlay with a hard timeout.
#[derive(Debug, Clone)]
pub struct LoadOverlay {
    status: LoadStatus,
    started: Instant,
    timeout: Duration,
    visible: bool,
}

impl LoadOverlay {
    pub fn new(timeout: Duration) -> Self {
        Self::started_at(timeout, Instant::now())
    }

    pub fn started_at(timeout: Duration, started: Instant) -> Self {
        Self {
            status: LoadStatus::Loading { progress: 0.0 },
            started,
            timeout,
            visible: true,
        }
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_progress(&mut self, progress: f32) {
        if let LoadStatus::Loading { .. } = self.status {
            self.status = LoadStatus::Loading {
                progress: progress.clamp(0.0, 1.0),
            };
        }
    }

    pub fn finish(&mut self, result: Result<(), &LoadError>) {
        match result {
            Ok(()) => {
                self.status = LoadStatus::Loaded;
                self.visible = false;
            }
            Err(e) => self.status = LoadStatus::Failed(e.to_string()),
        }
    }

    /// Hide the overlay once the timeout has elapsed. Returns true if this
    /// call hid it.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.visible && now.duration_since(self.started) >= self.timeout {
            log::warn!(
                "Loading overlay cleared after {:?} ({:?})",
                self.timeout,
                self.status
            );
            self.visible = false;
            return true;
        }
        false
    }

    /// Text to show, if the overlay is visible.
    pub fn message(&self) -> Option<String> {
        if !self.visible {
            return None;
        }
        match &self.status {
            LoadStatus::Loading { progress } => Some(format!("{:.0}% loaded", progress * 100.0)),
            LoadStatus::Loaded => None,
            LoadStatus::Failed(message) => Some(message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "body-explorer-{}-{}",
            std::process::id(),
            name
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let cancel = AtomicBool::new(false);
        let result = load_model(Path::new("/nonexistent/human_body.glb"), &cancel, |_| {});
        assert!(matches!(result, Err(LoadError::Io(_))));
    }

    #[test]
    fn test_garbage_file_is_decode_error() {
        let path = temp_file("garbage.glb", b"not a model");
        let cancel = AtomicBool::new(false);
        let mut last = 0.0;
        let result = load_model(&path, &cancel, |p| last = p);
        assert!(matches!(result, Err(LoadError::Decode(_))));
        assert_eq!(last, 1.0);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_cancelled_before_start() {
        let path = temp_file("cancel.glb", b"not a model");
        let cancel = AtomicBool::new(true);
        assert!(matches!(
            load_model(&path, &cancel, |_| {}),
            Err(LoadError::Cancelled)
        ));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_loader_thread_reports_failure() {
        let mut loader = ModelLoader::spawn(PathBuf::from("/nonexistent/model.glb")).unwrap();
        assert!(matches!(loader.wait(), Err(LoadError::Io(_))));
        assert!(loader.is_finished());
        assert!(loader.poll().is_none());
    }

    #[test]
    fn test_cancelled_loader_never_yields_a_model() {
        let path = temp_file("race.glb", b"not a model");
        let mut loader = ModelLoader::spawn(path.clone()).unwrap();
        loader.cancel();
        assert!(matches!(loader.wait(), Err(LoadError::Cancelled)));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_overlay_progress_and_success() {
        let mut overlay = LoadOverlay::new(Duration::from_secs(10));
        overlay.set_progress(0.42);
        assert_eq!(overlay.message().as_deref(), Some("42% loaded"));
        overlay.finish(Ok(()));
        assert!(!overlay.is_visible());
        assert_eq!(overlay.status(), &LoadStatus::Loaded);
        assert!(overlay.message().is_none());
    }

    #[test]
    fn test_overlay_failure_shows_message() {
        let mut overlay = LoadOverlay::new(Duration::from_secs(10));
        overlay.finish(Err(&LoadError::EmptyModel));
        assert!(overlay.is_visible());
        assert_eq!(
            overlay.message().as_deref(),
            Some("Model contains no triangle meshes")
        );
    }

    #[test]
    fn test_overlay_clears_after_timeout() {
        let start = Instant::now();
        let mut overlay = LoadOverlay::started_at(Duration::from_secs(10), start);
        assert!(!overlay.tick(start + Duration::from_secs(9)));
        assert!(overlay.is_visible());
        assert!(overlay.tick(start + Duration::from_secs(10)));
        assert!(!overlay.is_visible());
        assert!(!overlay.tick(start + Duration::from_secs(11)));
        // Still loading underneath
        assert!(matches!(overlay.status(), LoadStatus::Loading { .. }));
    }
}
