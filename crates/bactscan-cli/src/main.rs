//! bactscan CLI: find rod-shaped bacteria on AFM channel maps and pick
//! measurement points for follow-up spectroscopy.

use std::fs;
use std::path::{Path, PathBuf};

use bactscan::io::read_csv_map;
use bactscan::{BacteriaDetector, DetectReport, DetectionResult, ScanDetectConfig};
use clap::{Args, Parser, Subcommand};
use image::GrayImage;
use log::{info, warn};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "bactscan")]
#[command(about = "Detect rod-shaped bacteria on AFM topography maps")]
#[command(version)]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run detection on a topography/auxiliary CSV map pair.
    Detect(DetectArgs),

    /// Write the default configuration as JSON.
    InitConfig {
        /// Destination of the config file.
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct DetectArgs {
    /// Topography channel (comma-separated values, meters).
    #[arg(long)]
    topography: PathBuf,

    /// Auxiliary channel of the same scan (e.g. the R-Z error map).
    #[arg(long)]
    auxiliary: PathBuf,

    /// JSON config; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to write the detection report (JSON).
    #[arg(long, default_value = "bactscan_report.json")]
    out: PathBuf,

    /// Directory receiving PNG previews.
    #[arg(long)]
    preview_dir: Option<PathBuf>,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::InitConfig { out } => run_init_config(&out),
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(level: &str) -> CliResult<()> {
    let filter =
        bactscan_core::parse_level(level).ok_or_else(|| format!("unknown log level `{level}`"))?;
    bactscan_core::init_with_level(filter)?;
    Ok(())
}

#[cfg(feature = "tracing")]
fn init_logging(_level: &str) -> CliResult<()> {
    // RUST_LOG drives the filter in this mode
    bactscan_core::init_tracing(false);
    Ok(())
}

fn run_init_config(out: &Path) -> CliResult<()> {
    ScanDetectConfig::default().write_json(out)?;
    info!("default config written to {}", out.display());
    Ok(())
}

fn load_config(path: Option<&Path>) -> CliResult<ScanDetectConfig> {
    match path {
        Some(p) => Ok(ScanDetectConfig::load_json(p)?),
        None => Ok(ScanDetectConfig::default()),
    }
}

fn run_detect(args: &DetectArgs) -> CliResult<()> {
    let cfg = load_config(args.config.as_deref())?;
    info!("loading {}", args.topography.display());
    let topography = read_csv_map(&args.topography)?;
    info!("loading {}", args.auxiliary.display());
    let auxiliary = read_csv_map(&args.auxiliary)?;
    info!(
        "map size: {}x{}, {:.4} um/px",
        topography.rows(),
        topography.cols(),
        cfg.ratio()
    );

    let mut report = DetectReport::new(
        &cfg,
        args.config.as_deref(),
        &args.topography,
        &args.auxiliary,
        topography.shape(),
    );
    let detector = BacteriaDetector::new(cfg.detector_params())?;
    let frame = cfg.frame();

    match detector.detect(&topography, &auxiliary) {
        Ok(res) => {
            for obj in &res.objects {
                let stage = obj.to_stage(&frame);
                println!(
                    "{}: center px ({}, {}), stage ({:.3}, {:.3}) um, {:.2} x {:.2} um",
                    obj.name,
                    obj.points.center.x,
                    obj.points.center.y,
                    stage.points.center.x,
                    stage.points.center.y,
                    obj.length,
                    obj.width
                );
            }
            if !res.found {
                println!("no bacteria found");
            }
            if let Some(dir) = &args.preview_dir {
                report.previews = write_previews(dir, &res)?;
            }
            report.set_detection(&res, &frame);
            report.write_json(&args.out)?;
            info!("report written to {}", args.out.display());
            Ok(())
        }
        Err(err) => {
            warn!("detection failed: {err}");
            report.set_error(err.clone());
            report.write_json(&args.out)?;
            Err(err.into())
        }
    }
}

fn save_png(img: &GrayImage, path: PathBuf) -> CliResult<PathBuf> {
    img.save(&path)?;
    Ok(path)
}

fn write_previews(dir: &Path, res: &DetectionResult) -> CliResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = vec![
        save_png(&res.previews.contours, dir.join("contours.png"))?,
        save_png(&res.previews.objects, dir.join("objects.png"))?,
    ];
    for m in &res.previews.measurements {
        written.push(save_png(&m.image, dir.join(format!("{}_points.png", m.name)))?);
    }
    info!("{} previews written to {}", written.len(), dir.display());
    Ok(written)
}
