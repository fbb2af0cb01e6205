//! Disintegrate simulator
//!
//! Runs the engine headless against an in-memory document: one element in a
//! container of the same size, scrolled out of view a few pixels per frame.
//! Prints what the engine spawned and retired along the way.

mod sim;

use anyhow::{Context, Result};
use clap::Parser;
use disintegrate_core::EngineConfig;
use disintegrate_paint::Size;
use sim::{Axis, Simulation, Totals};
use std::path::PathBuf;

/// Headless driver for the disintegration engine
#[derive(Parser, Debug)]
#[command(name = "dis-sim")]
#[command(about = "Scroll an element out of its container and report particle spawning")]
#[command(version)]
struct Args {
    /// Engine configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(short, long, default_value = "120")]
    frames: u32,

    /// Pixels scrolled per frame
    #[arg(long, default_value = "2")]
    step_px: f32,

    /// Scroll direction
    #[arg(long, value_enum, default_value = "vertical")]
    axis: Axis,

    /// Element size as WIDTHxHEIGHT
    #[arg(long, default_value = "200x120", value_parser = parse_size)]
    size: Size,

    /// Particle type for the element
    #[arg(long)]
    particle_type: Option<String>,

    /// Override the configured sampling stride
    #[arg(long)]
    reduction_factor: Option<u32>,

    /// Seed for particle randomness
    #[arg(long)]
    seed: Option<u64>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn parse_size(value: &str) -> std::result::Result<Size, String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value:?}"))?;
    let width: u32 = w.trim().parse().map_err(|e| format!("width: {e}"))?;
    let height: u32 = h.trim().parse().map_err(|e| format!("height: {e}"))?;
    if width == 0 || height == 0 {
        return Err("size must be non-zero".to_string());
    }
    Ok(Size::new(width as f32, height as f32))
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(factor) = args.reduction_factor {
        config = config.with_reduction_factor(factor);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Effective configuration as a TOML document `--config` accepts back
fn render_config(config: &EngineConfig) -> Result<String> {
    toml::to_string_pretty(config).context("failed to render configuration")
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    let config = load_config(&args)?;
    if args.print_config {
        print!("{}", render_config(&config)?);
        return Ok(());
    }

    tracing::info!(
        width = args.size.width,
        height = args.size.height,
        frames = args.frames,
        step = args.step_px,
        axis = ?args.axis,
        reduction_factor = config.reduction_factor,
        "starting simulation"
    );

    let mut simulation = Simulation::new(config, args.size, args.particle_type.clone())?;
    let mut totals = Totals::default();

    for _ in 0..args.frames {
        let Some(report) = simulation.step(args.axis, args.step_px) else {
            anyhow::bail!("engine did not start");
        };
        totals.record(&report);

        if report.batches_created > 0 || report.elements_retired > 0 {
            println!(
                "frame {:>4}  batches +{}  spawned {:>6}  live {:>7}  retired {}",
                report.frame,
                report.batches_created,
                report.particles_spawned,
                report.live_particles,
                report.elements_retired,
            );
        }
        for event in simulation.drain_events() {
            println!("frame {:>4}  event {:?}", report.frame, event.kind);
        }
    }

    println!();
    println!("frames     {}", totals.frames);
    println!("batches    {}", totals.batches);
    println!("particles  {}", totals.particles);
    println!("retired    {}", totals.retired);
    println!("peak live  {}", totals.peak_live);
    if let Some(element) = simulation.engine().element(simulation.element()) {
        println!("pixels     {}", element.sample_counter());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use std::io::Write;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("200x120"), Ok(Size::new(200.0, 120.0)));
        assert_eq!(parse_size("64X32"), Ok(Size::new(64.0, 32.0)));
        assert!(parse_size("200").is_err());
        assert!(parse_size("0x10").is_err());
        assert!(parse_size("axb").is_err());
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["dis-sim"]);
        assert_eq!(args.frames, 120);
        assert_eq!(args.axis, Axis::Vertical);
        assert_eq!(args.size, Size::new(200.0, 120.0));

        let config = load_config(&args).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_overrides_validated() {
        let args = Args::parse_from(["dis-sim", "--reduction-factor", "0"]);
        assert!(load_config(&args).is_err());

        let args = Args::parse_from(["dis-sim", "--reduction-factor", "5", "--seed", "9"]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.reduction_factor, 5);
        assert_eq!(config.rng_seed, Some(9));
    }

    #[test]
    fn test_config_file_with_flag_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "reduction_factor = 8").unwrap();
        writeln!(file, "default_particle_type = \"ExplodingParticle\"").unwrap();
        let path = file.path().to_str().unwrap();

        let args = Args::parse_from(["dis-sim", "--config", path]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.reduction_factor, 8);
        assert_eq!(config.default_particle_type, "ExplodingParticle");

        let args = Args::parse_from(["dis-sim", "-c", path, "--reduction-factor", "2"]);
        assert_eq!(load_config(&args).unwrap().reduction_factor, 2);
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let args = Args::parse_from([OsStr::new("dis-sim"), OsStr::new("--config"), path.as_os_str()]);
        let err = load_config(&args).unwrap_err();
        assert!(err.to_string().contains("failed to load config"));
    }

    #[test]
    fn test_printed_config_loads_back() {
        let args = Args::parse_from([
            "dis-sim",
            "--print-config",
            "--reduction-factor",
            "6",
            "--seed",
            "3",
        ]);
        assert!(args.print_config);
        let config = load_config(&args).unwrap();
        let rendered = render_config(&config).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(rendered.as_bytes()).unwrap();
        let args = Args::parse_from(["dis-sim", "--config", file.path().to_str().unwrap()]);
        assert_eq!(load_config(&args).unwrap(), config);
        assert_eq!(EngineConfig::from_toml_str(&rendered).unwrap(), config);
    }
}
