use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    time::Duration,
};

use clap::{Parser, Subcommand};
use tokio::time::Instant;
use tracing::{error, info};

use qrpad::{
    config::Config,
    coordinator::{CommandClipboard, ConsoleNotifier, Coordinator, Providers, UiEvent},
    generator::{FileTarget, Logo, OutputFormat, RenderOptions, StyledRenderer},
    logger,
    scanner::{ImageBlob, ImageSequence, QrDecoder, StreamScanner},
    Error,
    StyleSelection,
};

#[derive(Debug, Parser)]
#[command(name = "qrpad", version, about = "Generate styled QR codes and scan them back")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a styled QR code to an .svg or .png file
    Generate {
        /// Payload, the configured default is used when empty
        #[arg(short, long, default_value = "")]
        text: String,
        /// square, rounded, dots or classy
        #[arg(short, long, default_value = "square")]
        style: String,
        /// Image embedded in the centre
        #[arg(short, long)]
        logo: Option<PathBuf>,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Decode a QR code from an image file
    Scan {
        image: PathBuf,
        /// Copy the decoded text to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Scan a directory of frames as a live camera stream
    Camera {
        frames: PathBuf,
        /// Replay the frames until a code is found
        #[arg(long = "loop")]
        looping: bool,
        /// Seconds to wait for a code
        #[arg(long, default_value_t = 10)]
        timeout: u64,
        #[arg(long)]
        copy: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            error!(%e, "qrpad failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> qrpad::Result<bool> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Generate { text, style, logo, out } => {
            if let Some(format) = OutputFormat::from_path(&out) {
                config.generator.format = format;
            }
            generate(&config, text, style, logo.as_deref(), out).await
        }
        Command::Scan { image, copy } => {
            let mut coordinator = coordinator(&config, ImageSequence::new(PathBuf::new()))?;
            coordinator.start_file_scan(Some(ImageBlob::read(&image).await?)).await;
            Ok(report(&mut coordinator, copy).await)
        }
        Command::Camera { frames, looping, timeout, copy } => {
            let mut coordinator = coordinator(&config, ImageSequence::new(frames).looping(looping))?;
            coordinator.start_camera_scan().await;
            if !coordinator.scan_until(Instant::now() + Duration::from_secs(timeout)).await {
                info!("No code found before timeout");
            }
            Ok(report(&mut coordinator, copy).await)
        }
    }
}

fn coordinator(config: &Config, frames: ImageSequence) -> qrpad::Result<Coordinator> {
    let options = RenderOptions::from_config(&config.generator, StyleSelection::default());
    let providers = Providers {
        renderer: Box::new(StyledRenderer::new(options)?),
        file_decoder: Box::new(QrDecoder),
        camera: Box::new(StreamScanner::new(frames)),
        clipboard: Box::new(CommandClipboard::from_config(&config.clipboard)),
        notifier: Box::new(ConsoleNotifier),
    };
    Ok(Coordinator::new(config, providers))
}

async fn generate(
    config: &Config,
    text: String,
    style: String,
    logo: Option<&Path>,
    out: PathBuf,
) -> qrpad::Result<bool> {
    let logo = match logo {
        Some(path) => Some(Logo::from_bytes(tokio::fs::read(path).await?)?),
        None => None,
    };

    let mut coordinator = coordinator(config, ImageSequence::new(PathBuf::new()))?;
    coordinator.mount(Box::new(FileTarget::new(&out)))?;

    for event in [UiEvent::SelectStyle(style), UiEvent::SetLogo(logo), UiEvent::EditText(text)] {
        coordinator.dispatch(event).await;
    }
    coordinator.shutdown().await;
    if !coordinator.preview_in_sync() {
        return Err(Error::StalePreview);
    }

    info!(path = %out.display(), style = %coordinator.request().style, "QR code written");
    println!("{}", out.display());
    Ok(true)
}

async fn report(coordinator: &mut Coordinator, copy: bool) -> bool {
    let view = coordinator.view();
    if view.scan_content_hidden {
        return false;
    }
    println!("{}", view.result_text);
    if let Some(link) = &view.result_link {
        info!(%link, "Result is a link");
    }
    if copy {
        coordinator.copy_result().await;
    }
    true
}
