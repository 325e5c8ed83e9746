// Copyright Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Attribution cannot be removed

use anyhow::{Context, Result, bail};
use clap::Parser;
use sorrel::engine_config::EngineConfig;
use sorrel::stores::{
    read_clustered_stores_from_path, read_geocoded_stores_from_path,
    write_clustered_stores_to_path,
};
use sorrel::territory::TerritoryEngine;
use sorrel::territory::distance_matrix::DistanceMatrix;
use sorrel::territory::membership::summarize;
use sorrel::territory_export::{write_geojson_to_path, write_summary_to_path};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// RON file with engine settings. Can also be set via SORREL_CONFIG.
    #[arg(long, global = true, env = "SORREL_CONFIG")]
    config: Option<PathBuf>,

    /// Neighbourhood radius in miles
    #[arg(long, global = true)]
    radius_mi: Option<f64>,

    /// Minimum neighbour count for a store to seed a territory
    #[arg(long, global = true)]
    min_size: Option<usize>,

    /// Neighbour count above which a seed needs only one radius of separation
    #[arg(long, global = true)]
    max_size: Option<usize>,

    /// Split pass thresholds (comma-separated), e.g. 250,160,120
    #[arg(long, global = true, value_delimiter = ',')]
    split_schedule: Option<Vec<usize>>,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Assign geocoded stores to territories
    Cluster {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Also write the map layer as GeoJSON
        #[arg(long)]
        geojson: Option<PathBuf>,
        /// Also write store counts per territory
        #[arg(long)]
        summary: Option<PathBuf>,
    },
    /// Write neighbourhood metrics without clustering
    Density {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Write the full pairwise distance matrix
    Matrix {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Re-export map files from an already clustered table
    Summary {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        geojson: Option<PathBuf>,
    },
}

impl Args {
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)
                .with_context(|| format!("Failed to load engine config {:?}", path))?,
            None => EngineConfig::default(),
        };

        if let Some(radius_mi) = self.radius_mi {
            config.radius_mi = radius_mi;
        }
        if let Some(min_size) = self.min_size {
            config.min_size = min_size;
        }
        if let Some(max_size) = self.max_size {
            config.max_size = max_size;
        }
        if let Some(schedule) = &self.split_schedule {
            config.split_schedule = schedule.clone();
        }

        config.validate()?;

        Ok(config)
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let config = args.engine_config()?;
    let engine = TerritoryEngine::new(config)?;

    match &args.command {
        Commands::Cluster {
            input,
            output,
            geojson,
            summary,
        } => {
            let start = Instant::now();
            let stores = load_geocoded(input)?;

            let outcome = engine
                .cluster(stores)
                .context("Territory clustering failed")?;

            write_clustered_stores_to_path(output, &outcome.stores)
                .with_context(|| format!("Failed to write clusters to {:?}", output))?;
            println!(
                "Wrote {} stores in {} territories to {:?} in {:?}",
                outcome.stores.len(),
                outcome.territory_count(),
                output,
                start.elapsed()
            );

            if let Some(path) = summary {
                write_summary_to_path(path, &outcome.stores)?;
                println!("Wrote territory summary to {:?}", path);
            }
            if let Some(path) = geojson {
                write_geojson_to_path(path, &outcome.stores)?;
                println!("Wrote map layer to {:?}", path);
            }
        }
        Commands::Density { input, output } => {
            let mut stores = load_geocoded(input)?;
            engine.annotate_density(&mut stores);

            write_clustered_stores_to_path(output, &stores)
                .with_context(|| format!("Failed to write neighbourhood to {:?}", output))?;
            println!("Wrote neighbourhood metrics to {:?}", output);
        }
        Commands::Matrix { input, output } => {
            let stores = load_geocoded(input)?;
            let matrix = DistanceMatrix::build(&stores);

            matrix
                .write_csv_to_path(output)
                .with_context(|| format!("Failed to write distance matrix to {:?}", output))?;
            println!(
                "Wrote {} distance edges to {:?}",
                matrix.edge_count(),
                output
            );
        }
        Commands::Summary {
            input,
            output,
            geojson,
        } => {
            let stores = read_clustered_stores_from_path(input)
                .with_context(|| format!("Failed to read clustered stores {:?}", input))?;

            if stores.iter().all(|s| s.territory_centre.is_none()) {
                bail!("{:?} has no territory assignments", input);
            }

            if output.is_none() && geojson.is_none() {
                for territory in summarize(&stores) {
                    println!(
                        "Territory {} at ({}, {}): {} stores",
                        territory.index,
                        territory.centre_latitude,
                        territory.centre_longitude,
                        territory.size
                    );
                }
            }
            if let Some(path) = output {
                write_summary_to_path(path, &stores)?;
                println!("Wrote territory summary to {:?}", path);
            }
            if let Some(path) = geojson {
                write_geojson_to_path(path, &stores)?;
                println!("Wrote map layer to {:?}", path);
            }
        }
    }

    Ok(())
}

fn load_geocoded(path: &Path) -> Result<Vec<sorrel::stores::Store>> {
    let stores = read_geocoded_stores_from_path(path)
        .with_context(|| format!("Failed to read geocoded stores {:?}", path))?;

    if stores.is_empty() {
        tracing::warn!("{:?} contains no stores", path);
    }

    Ok(stores)
}
