//! geospread CLI - batch declustering and POI proximity analysis
//!
//! Usage:
//!   geospread-cli decluster <points.csv> [--radius <m>] [--output <csv>]
//!   geospread-cli analyze <points.csv> --poi-dir <dir> [--radius <m>]
//!   geospread-cli fetch-drivetime <id> <lat> <lon> [--range <s>] [--out-dir <dir>]
//!
//! Points are read from CSV tables with id, latitude, longitude columns;
//! POI service areas from per-POI GeoJSON files produced by
//! `fetch-drivetime` (or any compatible isochrone source).

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use geospread::decluster::{decluster, DeclusterConfig};
use geospread::gateway::{csv_io, geojson_io, DrivetimeClient};
use geospread::pipeline::{AnalysisPipeline, PipelineConfig};
use geospread::ReferenceSystem;

#[derive(Parser)]
#[command(name = "geospread-cli")]
#[command(about = "Spatial point declustering and POI proximity analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Working projected reference system, e.g. EPSG:31370
    #[arg(long, global = true, default_value = "EPSG:31370")]
    crs: ReferenceSystem,
}

#[derive(Subcommand)]
enum Commands {
    /// Reduce spatial clustering in a point table
    Decluster {
        /// CSV point table (id, latitude, longitude[, uuid])
        points: PathBuf,

        /// Minimum spacing between surviving points, meters
        #[arg(short, long, default_value = "100")]
        radius: f64,

        /// Where to write the surviving points (CSV)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decluster a point table and report nearest-POI distances
    Analyze {
        /// CSV point table (id, latitude, longitude[, uuid])
        points: PathBuf,

        /// Directory of per-POI .geojson service-area collections
        #[arg(long)]
        poi_dir: PathBuf,

        /// Minimum spacing between surviving points, meters
        #[arg(short, long, default_value = "100")]
        radius: f64,
    },

    /// Fetch a drivetime polygon for one POI from OpenRouteService
    FetchDrivetime {
        /// POI identifier
        id: String,
        /// POI latitude (WGS84)
        latitude: f64,
        /// POI longitude (WGS84)
        longitude: f64,

        /// Drivetime range in seconds
        #[arg(long, default_value = "900")]
        range: u32,

        /// Directory to store the fetched GeoJSON in
        #[arg(long, default_value = "./geojson")]
        out_dir: PathBuf,

        /// OpenRouteService API key (falls back to ORS_SECRET)
        #[arg(long, env = "ORS_SECRET")]
        api_key: String,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Decluster {
            points,
            radius,
            output,
        } => run_decluster(&points, radius, output.as_deref(), cli.crs),
        Commands::Analyze {
            points,
            poi_dir,
            radius,
        } => run_analyze(points, poi_dir, radius, cli.crs),
        Commands::FetchDrivetime {
            id,
            latitude,
            longitude,
            range,
            out_dir,
            api_key,
        } => run_fetch_drivetime(&id, latitude, longitude, range, &out_dir, &api_key),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_decluster(
    points_path: &std::path::Path,
    radius: f64,
    output: Option<&std::path::Path>,
    crs: ReferenceSystem,
) -> geospread::Result<()> {
    let points = csv_io::read_points(points_path, crs)?;
    let config = DeclusterConfig {
        radius_meters: radius,
        ..DeclusterConfig::default()
    };

    let survivors = decluster(&points, &config)?;

    println!(
        "Declustered {} points down to {} (radius {} m, {})",
        points.len(),
        survivors.len(),
        radius,
        crs
    );

    if let Some(path) = output {
        csv_io::write_points(path, &survivors)?;
        println!("Wrote surviving points to {}", path.display());
    } else {
        for point in survivors.iter() {
            println!(
                "  {} ({:.6}, {:.6})",
                point.id(),
                point.latitude(),
                point.longitude()
            );
        }
    }

    Ok(())
}

fn run_analyze(
    points_path: PathBuf,
    poi_dir: PathBuf,
    radius: f64,
    crs: ReferenceSystem,
) -> geospread::Result<()> {
    let pipeline = AnalysisPipeline::new(PipelineConfig {
        points_path,
        poi_dir,
        crs,
        decluster: DeclusterConfig {
            radius_meters: radius,
            ..DeclusterConfig::default()
        },
    });

    let report = pipeline.run()?;

    println!(
        "Declustered {} points down to {}",
        report.input_count, report.surviving_count
    );
    for result in &report.results {
        println!(
            "  {} -> {} ({:.1} m)",
            result.point_id, result.poi_id, result.distance_meters
        );
    }
    match report.mean_distance_meters {
        Some(mean) => println!("Mean distance to nearest POI: {mean:.1} m"),
        None => println!("No surviving points; no distance summary"),
    }

    Ok(())
}

fn run_fetch_drivetime(
    id: &str,
    latitude: f64,
    longitude: f64,
    range: u32,
    out_dir: &std::path::Path,
    api_key: &str,
) -> geospread::Result<()> {
    let client = DrivetimeClient::new(api_key);
    let collection = client.fetch_isochrone(id, latitude, longitude, range)?;

    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(format!("{id}.geojson"));
    geojson_io::write_feature_collection(&path, collection)?;

    println!("Wrote isochrone for '{id}' to {}", path.display());
    Ok(())
}
