//! Gomoku GUI
//!
//! Play five-in-a-row against the AI.
//!
//! ## Usage
//!
//! - `gomoku` - Play with settings from `gomoku.toml` if present
//! - `gomoku --difficulty easy` - Override the AI strength
//! - `gomoku --no-learning` - Keep learned move data in memory only

use std::path::PathBuf;

use clap::Parser;
use log::{error, info};

use gomoku::learning::default_data_dir;
use gomoku::ui::GomokuApp;
use gomoku::{AppConfig, Difficulty};

/// Gomoku: five-in-a-row against a learning AI
#[derive(Parser)]
#[command(name = "gomoku")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, default_value = "gomoku.toml")]
    config: PathBuf,

    /// AI strength
    #[arg(long, value_enum)]
    difficulty: Option<Difficulty>,

    /// Maximum search depth for Hard
    #[arg(long)]
    depth: Option<u8>,

    /// Search time limit in milliseconds (0 = none)
    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// Directory for learned move data
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Do not read or write learned move data
    #[arg(long, conflicts_with = "data_dir")]
    no_learning: bool,
}

impl Cli {
    /// Flags override the file
    fn apply(self, config: &mut AppConfig) {
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(depth) = self.depth {
            config.engine.search_depth = depth;
        }
        if let Some(ms) = self.time_limit_ms {
            config.engine.time_limit_ms = ms;
        }
        if self.no_learning {
            config.engine.data_dir = None;
        } else if let Some(dir) = self.data_dir {
            config.engine.data_dir = Some(dir);
        } else if config.engine.data_dir.is_none() {
            config.engine.data_dir = default_data_dir();
        }
    }
}

fn main() -> Result<(), eframe::Error> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match AppConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };
    cli.apply(&mut config);
    if let Err(e) = config.validate() {
        error!("{}", e);
        std::process::exit(2);
    }
    info!(
        "starting: difficulty {}, depth {}, learning data {:?}",
        config.difficulty, config.engine.search_depth, config.engine.data_dir
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 680.0])
            .with_min_inner_size([700.0, 520.0])
            .with_title("Gomoku"),
        ..Default::default()
    };

    eframe::run_native(
        "Gomoku",
        options,
        Box::new(move |cc| Ok(Box::new(GomokuApp::new(cc, &config)))),
    )
}
