use std::path::PathBuf;

use async_trait::async_trait;
use image::DynamicImage;
use tokio::{sync::oneshot, task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{CameraConstraints, CameraScanner, DecodeSink, QrDecoder, ScanConfig};
use crate::error::{Error, Result};

#[async_trait]
pub trait FrameSource: Send + 'static {
    async fn open(&mut self, constraints: &CameraConstraints) -> Result<()>;

    /// `None` once the stream has ended.
    async fn next_frame(&mut self) -> Result<Option<DynamicImage>>;

    async fn close(&mut self) -> Result<()>;
}

/// Replays the images of a directory in file name order.
#[derive(Debug)]
pub struct ImageSequence {
    dir: PathBuf,
    looping: bool,
    frames: Vec<PathBuf>,
    cursor: usize,
}

impl ImageSequence {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), looping: false, frames: Vec::new(), cursor: 0 }
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }
}

#[async_trait]
impl FrameSource for ImageSequence {
    async fn open(&mut self, constraints: &CameraConstraints) -> Result<()> {
        let unavailable = |e: std::io::Error| Error::CameraUnavailable(format!("{}: {e}", self.dir.display()));
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(unavailable)?;

        let mut frames = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(unavailable)? {
            if entry.file_type().await.map_err(unavailable)?.is_file() {
                frames.push(entry.path());
            }
        }
        if frames.is_empty() {
            return Err(Error::CameraUnavailable(format!("no frames in {}", self.dir.display())));
        }
        frames.sort();

        debug!(dir = %self.dir.display(), frames = frames.len(), facing = ?constraints.facing_mode, "Frame source opened");
        self.frames = frames;
        self.cursor = 0;
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<Option<DynamicImage>> {
        if self.frames.is_empty() {
            return Err(Error::CameraNotRunning);
        }
        if self.cursor == self.frames.len() {
            if !self.looping {
                return Ok(None);
            }
            self.cursor = 0;
        }
        let bytes = tokio::fs::read(&self.frames[self.cursor]).await?;
        self.cursor += 1;
        Ok(Some(image::load_from_memory(&bytes)?))
    }

    async fn close(&mut self) -> Result<()> {
        self.frames.clear();
        self.cursor = 0;
        Ok(())
    }
}

struct Running<S> {
    stop: oneshot::Sender<()>,
    task: JoinHandle<S>,
}

/// Camera scanner over any [`FrameSource`]. The source moves into the frame loop while
/// scanning and is handed back on `stop`.
pub struct StreamScanner<S: FrameSource> {
    source: Option<S>,
    running: Option<Running<S>>,
}

impl<S: FrameSource> StreamScanner<S> {
    pub fn new(source: S) -> Self {
        Self { source: Some(source), running: None }
    }
}

#[async_trait]
impl<S: FrameSource> CameraScanner for StreamScanner<S> {
    async fn start(
        &mut self,
        constraints: &CameraConstraints,
        config: &ScanConfig,
        sink: DecodeSink,
    ) -> Result<()> {
        if self.running.is_some() {
            return Err(Error::CameraBusy);
        }
        let mut source = self
            .source
            .take()
            .ok_or_else(|| Error::CameraUnavailable("frame source lost".to_string()))?;
        if let Err(e) = source.open(constraints).await {
            self.source = Some(source);
            return Err(e);
        }

        let session = sink.session();
        let (stop, stop_rx) = oneshot::channel();
        let task = tokio::spawn(scan_frames(source, *config, sink, stop_rx));
        self.running = Some(Running { stop, task });
        info!(session, fps = config.fps, "Camera scan started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        let running = self.running.take().ok_or(Error::CameraNotRunning)?;
        // The loop may already have ended on its own
        let _ = running.stop.send(());
        let mut source = running.task.await?;
        let res = source.close().await;
        self.source = Some(source);
        info!("Camera scan stopped");
        res
    }

    fn is_scanning(&self) -> bool {
        self.running.is_some()
    }
}

async fn scan_frames<S: FrameSource>(
    mut source: S,
    config: ScanConfig,
    sink: DecodeSink,
    mut stop: oneshot::Receiver<()>,
) -> S {
    let mut ticker = tokio::time::interval(config.frame_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = ticker.tick() => {}
        }

        let frame = match source.next_frame().await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                debug!(session = sink.session(), "Frame stream ended");
                break;
            }
            // Unreadable frame, the stream itself is still alive
            Err(e @ Error::Image(_)) => {
                sink.frame_error(&e);
                continue;
            }
            Err(e) => {
                warn!(session = sink.session(), %e, "Frame capture failed");
                break;
            }
        };

        let qrbox = config.qrbox;
        match tokio::task::spawn_blocking(move || QrDecoder::decode_region(&frame, qrbox)).await {
            Ok(Ok(text)) => {
                if !sink.success(text) {
                    break;
                }
            }
            Ok(Err(e)) => sink.frame_error(&e),
            Err(e) => sink.frame_error(&Error::Task(e)),
        }
    }

    source
}
