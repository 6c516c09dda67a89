//! Oxid Player - headless runner for Oxid game modules
//!
//! Loads a compiled game module and its assets, then drives it at 60 Hz
//! with a headless graphics backend, real audio output and file-backed
//! storage.
//!
//! # Usage
//!
//! ```bash
//! oxid-player oxid.wasm --assets ./web
//! oxid-player https://example.com/oxid.wasm --assets https://example.com/
//! oxid-player oxid.wasm --frames 600 --key 32@60 --key 83@120
//! oxid-player oxid.wasm --sound --scale 2 --memory-storage
//! ```

mod audio_output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use oxid_host_core::config::{self, HostConfig};
use oxid_host_core::{
    HeadlessDisplay, HeadlessGl, Host, Location, StorageBridge, fetch_bundle,
};

use audio_output::CpalAudio;

const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Parser)]
#[command(name = "oxid-player")]
#[command(author, version, about = "Headless player for Oxid game modules")]
struct Args {
    /// Game module to run (.wasm path or URL)
    module: String,

    /// Directory or URL the asset manifest is fetched from
    #[arg(long, value_name = "DIR|URL")]
    assets: Option<String>,

    /// Stop after this many frames (default: run until killed)
    #[arg(long, value_name = "N")]
    frames: Option<u64>,

    /// Press and release a key code before a frame, e.g. 32@60
    #[arg(long = "key", value_name = "CODE@FRAME")]
    keys: Vec<ScheduledKey>,

    /// Turn sound on once the game is initialized
    #[arg(long)]
    sound: bool,

    /// Canvas scale applied after init
    #[arg(long, value_name = "N")]
    scale: Option<u32>,

    /// Config file to use instead of the platform default
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Keep storage in memory for this run only
    #[arg(long)]
    memory_storage: bool,
}

/// A key press scheduled on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScheduledKey {
    code: u32,
    frame: u64,
}

impl FromStr for ScheduledKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (code, frame) = s
            .split_once('@')
            .ok_or_else(|| format!("expected CODE@FRAME, got '{s}'"))?;
        let code = code
            .parse()
            .map_err(|e| format!("invalid key code '{code}': {e}"))?;
        let frame = frame
            .parse()
            .map_err(|e| format!("invalid frame '{frame}': {e}"))?;
        Ok(Self { code, frame })
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<HostConfig> {
    let mut config = match &args.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };
    if let Some(assets) = &args.assets {
        config.assets.base = assets.clone();
    }
    if let Some(scale) = args.scale {
        config.display.default_scale = scale;
    }
    if args.memory_storage {
        config.storage.durable = false;
    }
    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;

    let module = Location::parse(&args.module);
    let asset_base = Location::parse(&config.assets.base);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let bundle = runtime
        .block_on(fetch_bundle(&module, &asset_base, &config.assets.files))
        .with_context(|| format!("Failed to fetch {module}"))?;
    drop(runtime);

    let storage = StorageBridge::open_or_memory(config.storage_path());
    let audio = CpalAudio::new(config.audio.master_volume);
    let mut host = Host::new(
        config,
        HeadlessGl::without_log(),
        storage,
        HeadlessDisplay::new(false),
        audio,
        CpalAudio::available(),
    )?;

    host.load(&bundle)?;
    host.init()?;
    if args.sound {
        host.toggle_sound()?;
    }

    let start = Instant::now();
    let mut frame: u64 = 0;
    while args.frames.is_none_or(|limit| frame < limit) {
        for key in args.keys.iter().filter(|key| key.frame == frame) {
            let handled = host.key_down(key.code)?;
            tracing::debug!(code = key.code, frame, handled, "Scheduled key");
            host.key_up(key.code)?;
        }

        let timestamp = frame as f64 * FRAME_MS;
        host.animation_frame(timestamp)?;
        frame += 1;

        let due = Duration::from_secs_f64(frame as f64 * FRAME_MS / 1000.0);
        if let Some(wait) = due.checked_sub(start.elapsed()) {
            std::thread::sleep(wait);
        }
    }

    if let Some(game) = host.game() {
        tracing::info!(
            frames = frame,
            draw_calls = game.context().gl.backend.draw_calls(),
            "Run finished"
        );
    }
    Ok(())
}
