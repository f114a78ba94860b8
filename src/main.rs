use clap::{Parser, Subcommand, ValueEnum};
use dtf_cost::estimate::EstimateRequest;
use dtf_cost::types::{CoverageMethod, LengthUnit, Resolution};
use dtf_cost::{config, estimate, imaging, logging, output};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dtf-cost")]
#[command(about = "Production cost estimator for DTF printing")]
#[command(long_about = "\
Production cost estimator for DTF printing

Prices a print job from its design image: height from the image's pixel
height and resolution, ink and powder from how much of the design is
printed, film and overhead from the run length.

  dtf-cost estimate design.png
  dtf-cost estimate design.png --method colorant --format csv
  dtf-cost estimate --height 2.5             # no image: full coverage
  dtf-cost estimate design.png --price ink=1500

Configuration is read from ./dtf-cost.toml when present, or from --config.
Run 'dtf-cost gen-config' to generate a documented config file.

Set RUST_LOG=info (or debug) for diagnostics on stderr.")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./dtf-cost.toml if it exists)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate the cost of one print job
    Estimate(EstimateArgs),
    /// Print a stock dtf-cost.toml with all options documented
    GenConfig,
    /// Load and validate the config, then print the price book
    CheckConfig,
}

#[derive(clap::Args)]
struct EstimateArgs {
    /// Design image (PNG, JPEG, TIFF or WebP)
    image: Option<PathBuf>,

    /// Job height in the billing unit; replaces the height derived from the image
    #[arg(long)]
    height: Option<f64>,

    /// Coverage ratio between 0 and 1; replaces the measured coverage
    #[arg(long)]
    coverage: Option<f64>,

    /// Coverage method: alpha or colorant (defaults to [coverage] method)
    #[arg(long)]
    method: Option<CoverageMethod>,

    /// Medium width in the billing unit (defaults to [medium] width)
    #[arg(long)]
    width: Option<f64>,

    /// Image resolution in pixels per --resolution-unit; beats embedded metadata
    #[arg(long)]
    resolution: Option<f64>,

    /// Unit for --resolution: mm, cm, m or in
    #[arg(long, default_value = "in")]
    resolution_unit: LengthUnit,

    /// Override a unit price, e.g. --price ink=1500 (repeatable)
    #[arg(long = "price", value_name = "NAME=VALUE", value_parser = parse_price)]
    prices: Vec<(String, f64)>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Estimate(args) => {
            let mut config = load_cli_config(cli.config.as_deref())?;
            if let Some(width) = args.width {
                config.medium.width = width;
            }
            for (name, unit_price) in &args.prices {
                config.price_book.set_price(name, *unit_price)?;
            }
            init_thread_pool(&config.processing);

            let image = args
                .image
                .as_deref()
                .map(imaging::load_raster)
                .transpose()?;
            let request = EstimateRequest {
                image: image.as_ref(),
                manual_height: args.height,
                forced_coverage: args.coverage,
                method: args.method.unwrap_or(config.coverage.method),
                resolution: args
                    .resolution
                    .map(|ppu| Resolution::new(ppu, args.resolution_unit)),
            };
            let estimate = estimate::estimate(&request, &config)?;

            match args.format {
                OutputFormat::Table => output::print_estimate(&estimate),
                OutputFormat::Csv => output::print_csv(&estimate),
                OutputFormat::Json => println!("{}", output::format_json(&estimate)?),
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::CheckConfig => {
            let config = load_cli_config(cli.config.as_deref())?;
            output::print_config_summary(&config);
            println!("==> Config is valid");
        }
    }

    Ok(())
}

/// Explicit `--config` must exist; otherwise fall back to the working
/// directory's `dtf-cost.toml`, then stock defaults.
fn load_cli_config(path: Option<&Path>) -> Result<config::CostConfig, config::ConfigError> {
    match path {
        Some(path) => config::load_config_file(path),
        None => config::load_config(Path::new(".")),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; users can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Parse `name=value` for `--price`.
fn parse_price(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing material name in '{s}'"));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value.trim()))?;
    Ok((name.to_string(), value))
}
