use std::{path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use citygen::{
    config::{CityConfig, ConfigLoader, LayoutMode, TransportMode},
    export::export_city,
    pipeline::Pipeline,
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Procedural city generator")]
struct Cli {
    /// Path to a city YAML file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u32>,

    #[arg(long)]
    population: Option<i64>,

    /// Grid resolution (N x N cells)
    #[arg(long)]
    grid_size: Option<i64>,

    /// Developed radius as a fraction of the half grid
    #[arg(long)]
    radius_fraction: Option<f64>,

    #[arg(long)]
    hospitals: Option<i64>,

    #[arg(long)]
    schools: Option<i64>,

    /// car | public | walk
    #[arg(long)]
    transport: Option<TransportMode>,

    /// grid | radial
    #[arg(long)]
    layout: Option<LayoutMode>,

    /// Minimal green area per inhabitant in square metres
    #[arg(long)]
    green_per_capita: Option<f64>,

    /// Directory for exported files
    #[arg(long, default_value = "output")]
    output: PathBuf,

    /// Output file prefix (overrides the config's)
    #[arg(long)]
    prefix: Option<String>,

    /// Overrides the config's logging level
    #[arg(long)]
    log_level: Option<String>,

    /// Serve generated cities over HTTP instead of exporting once
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,
}

impl Cli {
    fn load_config(&self) -> Result<CityConfig> {
        let mut config = match &self.config {
            Some(path) => ConfigLoader::new(".").load(path)?,
            None => CityConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(population) = self.population {
            config.population = population;
        }
        if let Some(grid_size) = self.grid_size {
            config.grid_size = grid_size;
        }
        if let Some(radius) = self.radius_fraction {
            config.city_radius = radius;
        }
        if let Some(hospitals) = self.hospitals {
            config.hospitals = hospitals;
        }
        if let Some(schools) = self.schools {
            config.schools = schools;
        }
        if let Some(transport) = self.transport {
            config.transport = transport;
        }
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        if let Some(green) = self.green_per_capita {
            config.green_m2_per_capita = green;
        }
        if let Some(prefix) = &self.prefix {
            config.output_prefix = prefix.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        Ok(config)
    }
}

fn init_tracing(level: &str) -> Result<()> {
    let level = Level::from_str(level)
        .with_context(|| format!("Invalid log level '{level}'"))?;
    tracing_subscriber::fmt().with_max_level(level).init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    init_tracing(&config.logging.level)?;

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
        return runtime.block_on(web::run(WebServerConfig {
            base: config,
            host: cli.host,
            port: cli.port,
        }));
    }

    let mut pipeline = Pipeline::standard(config.normalize());
    let generation = pipeline.run();
    let settings = pipeline.settings();
    for report in &generation.reports {
        info!(stage = %report.name, duration_ms = report.duration_ms, "stage timing");
    }

    let manifest = export_city(
        &generation.city,
        settings,
        &cli.output,
        &config.output_prefix,
    )
    .with_context(|| format!("Failed to export into {}", cli.output.display()))?;

    println!(
        "City '{}' generated with seed {}: {} buildings, {} facilities. Wrote {} files to {}",
        config.display_name(),
        settings.seed,
        generation.city.buildings().len(),
        generation.city.facilities().len(),
        manifest.files.len() + 1,
        cli.output.display()
    );
    Ok(())
}
