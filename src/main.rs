//! Command line front end for aeroseg.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use ndarray::{Axis, stack};

use aeroseg::codec::{LogProgress, decode_batch_with_interval};
use aeroseg::config::{LogLevel, PipelineConfig};
use aeroseg::data::{self, Manifest, npy, train_test_split};
use aeroseg::{BatchDriver, CLASS_TABLE};

#[derive(Parser, Debug)]
#[command(name = "aeroseg", about = "Aerial segmentation label toolkit")]
struct Args {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Override the configured number of codec worker threads
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the class table
    Classes,
    /// Write a default configuration file
    InitConfig {
        /// Destination path
        path: Option<PathBuf>,
    },
    /// Split a manifest into train.csv and test.csv
    Split {
        /// Manifest to split
        manifest: PathBuf,
        /// Output directory
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Expand index masks (.npy) into PNG color masks
    Decode {
        /// Index masks, shape (N, H, W) or (N, H, W, 1)
        input: PathBuf,
        /// Output directory for PNG files
        #[arg(long)]
        out_dir: PathBuf,
        /// File name stem of the PNG files
        #[arg(long, default_value = "mask")]
        stem: String,
    },
    /// Collapse PNG color masks into one index mask array (.npy)
    Encode {
        /// Color mask images, all of the same size
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output .npy file
        #[arg(long)]
        out: PathBuf,
    },
    /// Load the training split of a manifest and write image/label arrays
    Prepare {
        /// Manifest (overrides dataset.manifest)
        manifest: Option<PathBuf>,
        /// Output directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let (mut config, default_load_error) = match &args.config {
        Some(path) => (
            PipelineConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None,
        ),
        None => match PipelineConfig::load_from_default_path() {
            Ok(config) => (config.unwrap_or_default(), None),
            Err(e) => (PipelineConfig::default(), Some(e)),
        },
    };
    if let Some(level) = args.log_level {
        config.log_level = level.into();
    }
    if args.threads.is_some() {
        config.codec.worker_threads = args.threads;
    }

    env_logger::Builder::new()
        .filter_level(config.log_level.into())
        .init();
    if let Some(e) = default_load_error {
        log::warn!("Ignoring default config file: {}", e);
    }

    match args.command {
        Command::Classes => {
            for class in &CLASS_TABLE {
                let [r, g, b] = class.color;
                println!("{:2}  {:<12} ({:3}, {:3}, {:3})", class.index, class.name, r, g, b);
            }
            Ok(())
        }
        Command::InitConfig { path } => {
            let path = path
                .or_else(PipelineConfig::default_path)
                .context("no config directory available, pass a path")?;
            PipelineConfig::new().save(&path)?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Split { manifest, out_dir } => split(&config, &manifest, &out_dir),
        Command::Decode {
            input,
            out_dir,
            stem,
        } => decode(&config, &input, &out_dir, &stem),
        Command::Encode { inputs, out } => encode(&config, &inputs, &out),
        Command::Prepare { manifest, out_dir } => {
            let manifest = manifest
                .or_else(|| config.dataset.manifest.clone())
                .context("no manifest given and dataset.manifest is not set")?;
            let out_dir = out_dir.unwrap_or_else(|| config.training.output_dir.clone());
            prepare(&config, &manifest, &out_dir)
        }
    }
}

fn split(config: &PipelineConfig, manifest: &Path, out_dir: &Path) -> Result<()> {
    let manifest = Manifest::load(manifest)?;
    let split = train_test_split(
        manifest.entries,
        config.dataset.test_fraction,
        config.dataset.seed,
    )?;

    std::fs::create_dir_all(out_dir)?;
    for (name, entries) in [("train.csv", split.train), ("test.csv", split.test)] {
        let path = out_dir.join(name);
        let count = entries.len();
        std::fs::write(&path, Manifest { entries }.to_text())?;
        log::info!("Wrote {} entries to {:?}", count, path);
    }
    Ok(())
}

fn decode(config: &PipelineConfig, input: &Path, out_dir: &Path, stem: &str) -> Result<()> {
    let masks = npy::read_index_masks(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let pool = config.worker_pool()?;
    let observer = LogProgress::new("Converted to RGB");

    let colors = pool.install(|| {
        decode_batch_with_interval(masks.view(), config.codec.progress_interval, &observer)
    })?;
    data::write_color_masks(out_dir, &colors, stem)?;
    Ok(())
}

fn encode(config: &PipelineConfig, inputs: &[PathBuf], out: &Path) -> Result<()> {
    let mut colors = Vec::with_capacity(inputs.len());
    for path in inputs {
        let batch = data::read_color_mask(path)
            .with_context(|| format!("reading {}", path.display()))?;
        colors.push(batch.index_axis_move(Axis(0), 0));
    }

    let driver = BatchDriver::logging("Converted to index")
        .with_policy(config.codec.unknown_color)
        .with_progress_interval(config.codec.progress_interval);
    let pool = config.worker_pool()?;
    let masks = pool.install(|| driver.encode_all(&colors))?;

    let first = masks[0].dim();
    if let Some(i) = masks.iter().position(|m| m.dim() != first) {
        bail!(
            "{} is {:?} but {} is {:?}; resize masks before encoding",
            inputs[i].display(),
            masks[i].dim(),
            inputs[0].display(),
            first
        );
    }

    let views: Vec<_> = masks.iter().map(|m| m.view()).collect();
    let batch = stack(Axis(0), &views)?;
    npy::write_index_masks(out, &batch)?;
    log::info!("Wrote {:?} index masks to {:?}", batch.shape(), out);
    Ok(())
}

fn prepare(config: &PipelineConfig, manifest: &Path, out_dir: &Path) -> Result<()> {
    let manifest = Manifest::load(manifest)?;
    let split = train_test_split(
        manifest.entries,
        config.dataset.test_fraction,
        config.dataset.seed,
    )?;
    log::info!(
        "Preparing {} training samples ({} held out)",
        split.train.len(),
        split.test.len()
    );

    let pool = config.worker_pool()?;
    let observer = LogProgress::new("Loaded");
    let options = config.load_options();
    let batch = pool.install(|| data::load_batch(&split.train, &options, &observer))?;

    if batch.labels.iter().any(|&v| usize::from(v) >= config.training.num_classes) {
        log::warn!(
            "Labels contain classes beyond training.num_classes = {}",
            config.training.num_classes
        );
    }

    std::fs::create_dir_all(out_dir)?;
    npy::write_images(&out_dir.join("train_images.npy"), &batch.images)?;
    npy::write_index_masks(&out_dir.join("train_labels.npy"), &batch.labels)?;
    std::fs::write(out_dir.join("test.csv"), Manifest { entries: split.test }.to_text())?;

    println!(
        "{} samples written to {} ({} skipped)",
        batch.len(),
        out_dir.display(),
        batch.skipped.len()
    );
    Ok(())
}
