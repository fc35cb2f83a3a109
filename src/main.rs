//! vrkit - procedural VR keyboards and panels
//!
//! Headless driver: builds a keyboard from configuration and types on it
//! with a simulated controller.

mod config;
mod typist;

use anyhow::{Context, Result};
use clap::Parser;
use config::AppConfig;
use std::path::PathBuf;
use tracing::info;
use typist::{FrameDriver, Typist};
use vrkit_core::{RuntimeLog, TransactionLog, UndoLog};
use vrkit_ui3d::{Keyboard, KeyboardFactory, UIManager};

#[derive(Parser, Debug)]
#[command(author, version, about = "Build a VR keyboard headlessly and type on it", long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Idle frames to run after typing
    #[arg(long, default_value_t = 1)]
    frames: u64,
    /// Record undo groups and destroy immediately instead of at frame end
    #[arg(long)]
    editor: bool,
    /// Text to type on the keyboard
    #[arg(long = "type", value_name = "TEXT")]
    text: Option<String>,
    /// Press return after typing
    #[arg(long)]
    submit: bool,
}

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting vrkit v{}", env!("CARGO_PKG_VERSION"));
    vrkit_ui3d::init();

    let args = Args::parse();
    let cfg = AppConfig::load_from_path(&args.config);

    let log: Box<dyn TransactionLog> = if args.editor {
        Box::new(UndoLog::new())
    } else {
        Box::new(RuntimeLog::new())
    };
    let mut ui = UIManager::new(log);
    let root = ui.scene_mut().spawn("KeyboardRoot");

    let factory = KeyboardFactory::new(cfg.keyboard.clone());
    let keyboard = {
        let (scene, log) = ui.parts_mut();
        factory
            .build_keyboard(scene, log, root, &cfg.profiles.borrowed())
            .context("building keyboard")?
    };
    info!(nodes = ui.scene().len(), "keyboard ready");

    let hand = ui
        .add_controller("RightHand", 0, cfg.pointer_z_offset)
        .context("adding controller")?;
    if let Some(controller) = ui.controller_mut(hand) {
        controller.set_hardware_model(&cfg.controller_model);
    }

    let mut driver = FrameDriver::new(ui, hand);
    driver.step(&[]);

    let typist = Typist::new(keyboard.node);
    if let Some(text) = &args.text {
        typist.type_text(&mut driver, text)?;
    }
    if args.submit {
        typist.type_char(&mut driver, '\n')?;
    }
    for _ in 0..args.frames {
        driver.step(&[]);
    }

    let state = driver
        .ui()
        .scene()
        .get::<Keyboard>(keyboard.node)
        .context("keyboard state missing")?;
    println!("frames: {}", driver.frames());
    println!("panel: {:?}", state.active());
    println!("value: {:?}", state.value);
    for submitted in &state.submitted {
        println!("submitted: {submitted:?}");
    }
    Ok(())
}
