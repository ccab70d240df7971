//! The mode coordinator: sole owner of page state.
//!
//! It keeps file scanning and camera scanning mutually exclusive, routes every decoded text to
//! the shared result display, and drives the generator preview. Provider calls are awaited
//! while holding `&mut self`, so a camera teardown always completes before a file scan starts.

mod services;
mod view;

pub use services::{Clipboard, CommandClipboard, ConsoleNotifier, Notifier};
pub use view::{is_http_url, PageView};

use tokio::{
    sync::mpsc,
    time::{timeout_at, Instant},
};
use tracing::{debug, error, info, trace, warn};

use crate::{
    config::Config,
    error::Result,
    generator::{Debouncer, GeneratorRequest, Logo, RenderTarget, Renderer},
    scanner::{CameraConstraints, CameraHit, CameraScanner, DecodeSink, FileDecoder, ImageBlob, ScanConfig},
    style::StyleSelection,
};

pub const SCAN_FILE_FAILED: &str = "Could not scan QR code from image. Please try another image.";
pub const CAMERA_START_FAILED: &str = "Camera permission denied or error starting camera.";
pub const COPY_SUCCEEDED: &str = "Copied successfully!";
pub const COPY_FAILED: &str = "Failed to copy text.";

pub struct Providers {
    pub renderer: Box<dyn Renderer>,
    pub file_decoder: Box<dyn FileDecoder>,
    pub camera: Box<dyn CameraScanner>,
    pub clipboard: Box<dyn Clipboard>,
    pub notifier: Box<dyn Notifier>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ScanSession {
    #[default]
    Inactive,
    FileScanInFlight,
    CameraActive {
        session: u64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    SelectStyle(String),
    EditText(String),
    /// `None` when the file selection was cleared.
    SetLogo(Option<Logo>),
    ScanFile(Option<ImageBlob>),
    StartCamera,
    StopCamera,
    CopyResult,
}

enum Internal {
    PreviewDue,
    Hit(CameraHit),
}

pub struct Coordinator {
    renderer: Box<dyn Renderer>,
    file_decoder: Box<dyn FileDecoder>,
    camera: Box<dyn CameraScanner>,
    clipboard: Box<dyn Clipboard>,
    notifier: Box<dyn Notifier>,

    default_data: String,
    constraints: CameraConstraints,
    scan_config: ScanConfig,

    request: GeneratorRequest,
    preview: Debouncer,
    session: ScanSession,
    last_session: u64,
    view: PageView,

    hits_tx: mpsc::UnboundedSender<CameraHit>,
    hits_rx: mpsc::UnboundedReceiver<CameraHit>,
}

impl Coordinator {
    pub fn new(config: &Config, providers: Providers) -> Self {
        let (hits_tx, hits_rx) = mpsc::unbounded_channel();
        Self {
            renderer: providers.renderer,
            file_decoder: providers.file_decoder,
            camera: providers.camera,
            clipboard: providers.clipboard,
            notifier: providers.notifier,
            default_data: config.generator.default_data.clone(),
            constraints: CameraConstraints::from(&config.scanner),
            scan_config: ScanConfig::from(&config.scanner),
            request: GeneratorRequest::default(),
            preview: Debouncer::new(config.generator.debounce()),
            session: ScanSession::Inactive,
            last_session: 0,
            view: PageView::default(),
            hits_tx,
            hits_rx,
        }
    }

    /// Mounts the live code into `target` and hides the preview placeholder.
    pub fn mount(&mut self, target: Box<dyn RenderTarget>) -> Result<()> {
        self.renderer.append(target)?;
        self.view.preview_placeholder_hidden = true;
        Ok(())
    }

    pub fn view(&self) -> &PageView {
        &self.view
    }

    pub fn session(&self) -> ScanSession {
        self.session
    }

    pub fn request(&self) -> &GeneratorRequest {
        &self.request
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    pub fn preview_pending(&self) -> bool {
        self.preview.is_pending()
    }

    /// Whether the mounted artifact shows the current request. False while a preview is pending
    /// or after a failed render left the previous code in place.
    pub fn preview_in_sync(&self) -> bool {
        let current = self.renderer.options();
        let mut expected = current.clone();
        expected.apply(self.request.to_patch(&self.default_data));
        !self.preview.is_pending() && expected == *current
    }
}

// Generator
//------------------------------------------------------------------------------

impl Coordinator {
    /// Unknown names are ignored. Returns whether the style changed.
    pub fn select_style(&mut self, name: &str) -> bool {
        let Some(style) = StyleSelection::parse(name) else {
            debug!(name, "Ignoring unknown style");
            return false;
        };
        self.request.style = style;
        self.view.active_style = style;
        // The immediate render already carries the latest text
        self.preview.cancel();
        self.render_preview();
        true
    }

    pub fn set_text(&mut self, text: String) {
        self.request.text = text;
        self.update_generator_preview();
    }

    pub fn set_logo(&mut self, logo: Option<Logo>) {
        debug!(logo = ?logo, "Logo changed");
        self.request.logo = logo;
        self.update_generator_preview();
    }

    /// Debounced: only the last call within the quiet window renders.
    pub fn update_generator_preview(&mut self) {
        self.preview.schedule();
    }

    /// Renders a pending preview right away. Returns whether one was pending.
    pub fn flush_preview(&mut self) -> bool {
        let pending = self.preview.cancel();
        if pending {
            self.render_preview();
        }
        pending
    }

    fn render_preview(&mut self) {
        let patch = self.request.to_patch(&self.default_data);
        match self.renderer.update(patch) {
            Ok(()) => debug!(style = %self.request.style, "Preview updated"),
            Err(e) => warn!(%e, "Preview render failed, keeping previous code"),
        }
    }
}

// Scanner
//------------------------------------------------------------------------------

impl Coordinator {
    /// `None` (no file selected) is ignored.
    pub async fn start_file_scan(&mut self, blob: Option<ImageBlob>) {
        let Some(blob) = blob else {
            return;
        };
        if matches!(self.session, ScanSession::CameraActive { .. }) {
            self.stop_camera_scan().await;
        }

        self.session = ScanSession::FileScanInFlight;
        debug!(name = ?blob.name, "File scan started");
        match self.file_decoder.decode_file(&blob).await {
            Ok(text) => {
                info!(name = ?blob.name, "File scan decoded");
                self.on_decode_success(&text);
            }
            Err(e) => {
                error!(%e, "Error scanning file");
                self.notifier.notify(SCAN_FILE_FAILED);
            }
        }
        self.session = ScanSession::Inactive;
    }

    pub async fn start_camera_scan(&mut self) {
        if let ScanSession::CameraActive { session } = self.session {
            debug!(session, "Camera already active");
            return;
        }

        self.view.enter_camera_mode();
        self.last_session += 1;
        let session = self.last_session;
        let sink = DecodeSink::new(session, self.hits_tx.clone());

        match self.camera.start(&self.constraints, &self.scan_config, sink).await {
            Ok(()) => {
                self.session = ScanSession::CameraActive { session };
                info!(session, "Camera active");
            }
            Err(e) => {
                error!(%e, "Error starting camera");
                self.notifier.notify(CAMERA_START_FAILED);
                self.stop_camera_scan().await;
            }
        }
    }

    /// Idempotent. Teardown failures are logged, the session ends regardless.
    pub async fn stop_camera_scan(&mut self) {
        if let ScanSession::CameraActive { session } = self.session {
            match self.camera.stop().await {
                Ok(()) => debug!(session, "Camera stopped"),
                Err(e) => error!(session, %e, "Error stopping camera"),
            }
            self.session = ScanSession::Inactive;
        }
        self.view.reset_scanner();
    }

    pub fn on_decode_success(&mut self, text: &str) {
        self.view.show_result(text);
        debug!(link = self.view.result_link.is_some(), "Result shown");
    }

    pub async fn copy_result(&mut self) {
        if self.view.result_text.is_empty() {
            return;
        }
        match self.clipboard.write(&self.view.result_text).await {
            Ok(()) => self.notifier.notify(COPY_SUCCEEDED),
            Err(e) => {
                warn!(%e, "Clipboard write failed");
                self.notifier.notify(COPY_FAILED);
            }
        }
    }

    // First hit of the live session wins, everything after it is stale
    async fn handle_hit(&mut self, hit: CameraHit) {
        match self.session {
            ScanSession::CameraActive { session } if session == hit.session => {
                info!(session, "Camera decoded");
                self.on_decode_success(&hit.text);
                self.stop_camera_scan().await;
            }
            _ => trace!(session = hit.session, "Discarding stale camera hit"),
        }
    }
}

// Event loop
//------------------------------------------------------------------------------

impl Coordinator {
    pub async fn dispatch(&mut self, event: UiEvent) {
        trace!(?event, "Dispatch");
        match event {
            UiEvent::SelectStyle(name) => {
                self.select_style(&name);
            }
            UiEvent::EditText(text) => self.set_text(text),
            UiEvent::SetLogo(logo) => self.set_logo(logo),
            UiEvent::ScanFile(blob) => self.start_file_scan(blob).await,
            UiEvent::StartCamera => self.start_camera_scan().await,
            UiEvent::StopCamera => self.stop_camera_scan().await,
            UiEvent::CopyResult => self.copy_result().await,
        }
    }

    /// Waits for the next timer expiry or camera hit and handles it.
    pub async fn tick(&mut self) {
        let internal = self.next_internal().await;
        self.handle_internal(internal).await;
    }

    /// Processes events until the sender side closes, then flushes the preview and stops the camera.
    pub async fn run(&mut self, mut events: mpsc::Receiver<UiEvent>) {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.dispatch(event).await,
                    None => break,
                },
                internal = self.next_internal() => self.handle_internal(internal).await,
            }
        }
        self.shutdown().await;
    }

    /// Handles timer expiries and camera hits while the camera session lasts. Stops the camera
    /// and returns false if `deadline` passes first.
    pub async fn scan_until(&mut self, deadline: Instant) -> bool {
        while matches!(self.session, ScanSession::CameraActive { .. }) {
            match timeout_at(deadline, self.next_internal()).await {
                Ok(internal) => self.handle_internal(internal).await,
                Err(_) => {
                    self.stop_camera_scan().await;
                    return false;
                }
            }
        }
        true
    }

    pub async fn shutdown(&mut self) {
        self.flush_preview();
        if matches!(self.session, ScanSession::CameraActive { .. }) {
            self.stop_camera_scan().await;
        }
    }

    // Cancel safe: neither branch loses state when dropped
    async fn next_internal(&mut self) -> Internal {
        tokio::select! {
            () = self.preview.expired() => Internal::PreviewDue,
            Some(hit) = self.hits_rx.recv() => Internal::Hit(hit),
        }
    }

    async fn handle_internal(&mut self, internal: Internal) {
        match internal {
            Internal::PreviewDue => self.render_preview(),
            Internal::Hit(hit) => self.handle_hit(hit).await,
        }
    }
}
