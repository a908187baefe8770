use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use decoder::{FilterDescription, GenericFeatureFilter, TileGeometryDecoder};
use foundation::GeoCoordinates;
use foundation::math::ProjectionKind;
use serde::Serialize;
use tools::{TileInput, TileReport, decode_tile_report, parse_tile_key, totals};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tilegeo", about = "Decode vector tiles into world-space geometry")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode a tile file (MVT, optionally gzipped, or geojson-vt JSON) and
    /// print a summary of the emitted geometry.
    Decode {
        path: PathBuf,
        /// Tile address as z/x/y; read from JSON tiles when omitted.
        #[arg(long)]
        tile: Option<String>,
        /// JSON feature filter description.
        #[arg(long)]
        filter: Option<PathBuf>,
        #[arg(long, default_value = "mercator")]
        projection: ProjectionKind,
        #[arg(long)]
        pretty: bool,
    },
    /// Project a geographic coordinate into world space and back.
    Project {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
        #[arg(long, default_value_t = 0.0)]
        altitude: f64,
        #[arg(long, default_value = "mercator")]
        projection: ProjectionKind,
    },
}

#[derive(Debug, Serialize)]
struct DecodeOutput<'a> {
    #[serde(flatten)]
    report: &'a TileReport,
    totals: BTreeMap<&'static str, usize>,
}

#[derive(Debug, Serialize)]
struct ProjectOutput {
    projection: &'static str,
    world: [f64; 3],
    roundtrip: GeoCoordinates,
    scale_factor: f64,
    surface_normal: [f64; 3],
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    match Cli::parse().command {
        Command::Decode {
            path,
            tile,
            filter,
            projection,
            pretty,
        } => cmd_decode(path, tile, filter, projection, pretty),
        Command::Project {
            latitude,
            longitude,
            altitude,
            projection,
        } => cmd_project(latitude, longitude, altitude, projection),
    }
}

fn cmd_decode(
    path: PathBuf,
    tile: Option<String>,
    filter: Option<PathBuf>,
    projection: ProjectionKind,
    pretty: bool,
) -> Result<(), String> {
    let input = TileInput::read(&path)?;
    let key = match tile {
        Some(s) => parse_tile_key(&s)?,
        None => input
            .embedded_key()?
            .ok_or("binary tiles need --tile z/x/y".to_string())?,
    };
    debug!(%key, ?projection, "decoding {path:?}");

    let mut decoder = TileGeometryDecoder::with_projection(projection.create());
    if let Some(filter_path) = filter {
        let text = std::fs::read_to_string(&filter_path)
            .map_err(|e| format!("read {filter_path:?}: {e}"))?;
        let description: FilterDescription =
            serde_json::from_str(&text).map_err(|e| format!("parse {filter_path:?}: {e}"))?;
        decoder.set_filter(Some(Arc::new(GenericFeatureFilter::new(description))));
    }

    let report =
        decode_tile_report(&input.as_data(), key, &decoder).map_err(|e| format!("{path:?}: {e}"))?;
    let out = DecodeOutput {
        totals: totals(&report),
        report: &report,
    };
    print_json(&out, pretty)
}

fn cmd_project(
    latitude: f64,
    longitude: f64,
    altitude: f64,
    kind: ProjectionKind,
) -> Result<(), String> {
    let projection = kind.create();
    let geo = GeoCoordinates::with_altitude(latitude, longitude, altitude);
    let world = projection.project_point(&geo);
    let out = ProjectOutput {
        projection: kind.as_str(),
        world: world.as_array(),
        roundtrip: projection.unproject_point(world),
        scale_factor: projection.scale_factor(world),
        surface_normal: projection.surface_normal(world).as_array(),
    };
    print_json(&out, true)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| format!("serialize output: {e}"))?;
    println!("{text}");
    Ok(())
}
