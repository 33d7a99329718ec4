use crate::app::{App, AppOptions, TerminalGuard};
use crate::config::{AnimationMode, AnimationShape, ColorFillType, Settings, default_config_path};
use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

mod app;
mod breathing;
mod color;
mod config;
mod render;
mod ui;

/// Breathe along with a slowly growing and shrinking shape.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// The path to the config file to load and save preferences to.
    #[clap(short, long, env = "EXHALE_CONFIG")]
    config: Option<PathBuf>,

    /// Write logs to this file. Log levels are set via RUST_LOG.
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// The shape to animate.
    #[clap(long)]
    shape: Option<AnimationShape>,

    /// How the shape is filled.
    #[clap(long)]
    fill: Option<ColorFillType>,

    /// The curve progress follows while breathing in and out.
    #[clap(long)]
    animation_mode: Option<AnimationMode>,

    /// Seconds to breathe in.
    #[clap(long)]
    inhale: Option<f64>,

    /// Seconds to breathe out.
    #[clap(long)]
    exhale: Option<f64>,

    /// Seconds to hold after breathing in.
    #[clap(long)]
    hold_in: Option<f64>,

    /// Seconds to hold after breathing out.
    #[clap(long)]
    hold_out: Option<f64>,

    /// Multiplier applied to every duration after each full cycle.
    #[clap(long)]
    drift: Option<f64>,

    /// Keep the shape in the phase's own color instead of fading between colors.
    #[clap(long)]
    no_color_transition: bool,

    /// Show the current phase and a countdown at the bottom of the screen.
    #[clap(long)]
    show_phase: bool,

    /// Frames drawn per second.
    #[clap(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..=240))]
    fps: u32,

    /// Print the effective configuration as YAML and exit.
    #[clap(long)]
    print_config: bool,
}

impl Cli {
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(shape) = self.shape {
            settings.shape = shape;
        }
        if let Some(fill) = self.fill {
            settings.color_fill_type = fill;
        }
        if let Some(mode) = self.animation_mode {
            settings.animation_mode = mode;
        }
        let durations = [
            (self.inhale, &mut settings.inhale_duration),
            (self.exhale, &mut settings.exhale_duration),
            (self.hold_in, &mut settings.post_inhale_hold_duration),
            (self.hold_out, &mut settings.post_exhale_hold_duration),
        ];
        for (value, target) in durations {
            if let Some(value) = value {
                *target = value;
            }
        }
        if let Some(drift) = self.drift {
            settings.drift = drift;
        }
        if self.no_color_transition {
            settings.color_transition_enabled = false;
        }
    }
}

fn init_logging(log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(path) = log_file {
        let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn load_settings(cli: &Cli, config_path: Option<&PathBuf>) -> anyhow::Result<Settings> {
    let mut settings = match config_path {
        Some(path) => Settings::load(path).with_context(|| format!("loading config from {}", path.display()))?,
        None => Settings::default(),
    };
    cli.apply_overrides(&mut settings);
    settings.validate().context("invalid command line arguments")?;
    Ok(settings)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.log_file.as_ref())?;

    let config_path = cli.config.clone().or_else(default_config_path);
    let settings = load_settings(&cli, config_path.as_ref())?;
    if cli.print_config {
        print!("{}", settings.to_yaml()?);
        return Ok(());
    }

    let options = AppOptions {
        config_path,
        frame_interval: Duration::from_secs(1) / cli.fps,
        show_phase: cli.show_phase,
    };
    let dimensions = crossterm::terminal::size().context("querying terminal size")?;

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        TerminalGuard::restore();
        default_hook(info);
    }));

    let _guard = TerminalGuard::new().context("setting up terminal")?;
    let mut app = App::new(settings, options, io::stdout(), dimensions);
    app.run()
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
