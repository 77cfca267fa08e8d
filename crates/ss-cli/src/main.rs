//! `streetsafe` — offline build pipeline and one-off route queries.
//!
//! The offline stages run as separate invocations (typically from a
//! scheduled job) and exchange deterministic CSV artifacts:
//!
//! ```text
//! streetsafe build-mask  walkable-points.csv → walkable-mask
//! streetsafe score       incidents.csv + segments.csv → scored-segments
//! streetsafe build-graph scored-segments + walkable-mask → graph.*
//! streetsafe route       graph.* + walkable-mask → one JSON route
//! ```
//!
//! Logging goes through `env_logger`; set `RUST_LOG=info` for build
//! milestones or `RUST_LOG=debug` for per-search statistics.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use ss_core::{Coord, EngineConfig};
use ss_engine::{GraphHandle, RouteRequest};
use ss_graph::artifacts::{save_graph, MASK_FILE, SCORED_FILE};
use ss_graph::GraphBuilder;
use ss_score::incident::load_incidents_csv;
use ss_score::segment::{load_scored_csv, load_segments_csv, save_scored_csv};
use ss_score::{SafetyScorer, ScorerConfig};
use ss_search::RouteKind;
use ss_spatial::WalkabilityMask;

#[derive(Parser, Debug)]
#[command(
    name = "streetsafe",
    version,
    about = "Safety-aware pedestrian routing for Washington DC"
)]
struct Cli {
    /// Engine configuration file (JSON).  Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Quantize a walkable-tag extract into the walkable-mask artifact.
    BuildMask {
        /// CSV of walkable points (lat,lon), one row per tagged location.
        #[arg(long)]
        points: PathBuf,

        /// Output directory for the walkable-mask artifact.
        #[arg(long, default_value = "data")]
        out: PathBuf,
    },

    /// Score street segments against historical crime incidents.
    Score {
        /// Typed incident CSV (lat,lon,offense,year,shift).
        #[arg(long)]
        incidents: PathBuf,

        /// Street centerline CSV (id,street_name,road_type,quadrant,polyline).
        #[arg(long)]
        segments: PathBuf,

        /// Output directory for the scored-segments artifact.
        #[arg(long, default_value = "data")]
        out: PathBuf,
    },

    /// Build the routing graph from scored segments and the walkable mask.
    BuildGraph {
        /// Directory holding scored-segments and walkable-mask.
        #[arg(long, default_value = "data")]
        data: PathBuf,

        /// Output directory for the graph artifacts (defaults to --data).
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Answer one route request and print the response as JSON.
    Route {
        /// Start "lat,lon".
        #[arg(long)]
        from: String,

        /// End "lat,lon".
        #[arg(long)]
        to: String,

        /// quickest | balanced | safest | detour{5,10,15,20,25,30}
        #[arg(long, default_value = "quickest")]
        kind: String,

        /// Attach the debug block to the response.
        #[arg(long)]
        debug: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.cmd {
        Commands::BuildMask { points, out } => build_mask(&points, &out),
        Commands::Score {
            incidents,
            segments,
            out,
        } => score(&incidents, &segments, &out),
        Commands::BuildGraph { data, out } => build_graph(&data, out.as_deref().unwrap_or(&data)),
        Commands::Route {
            from,
            to,
            kind,
            debug,
        } => route(config, &from, &to, &kind, debug),
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<EngineConfig> {
    match path {
        None => Ok(EngineConfig::default()),
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("reading config {}", p.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", p.display()))
        }
    }
}

fn build_mask(points: &std::path::Path, out: &std::path::Path) -> Result<()> {
    let file = std::fs::File::open(points)
        .with_context(|| format!("opening {}", points.display()))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut mask = WalkabilityMask::new();
    for (i, row) in reader.deserialize::<(f64, f64)>().enumerate() {
        let (lat, lon) = row.with_context(|| format!("row {} of walkable points", i + 1))?;
        if !Coord::new(lat, lon).in_valid_range() {
            bail!("row {}: coordinates ({lat}, {lon}) out of range", i + 1);
        }
        mask.insert(lat, lon);
    }

    std::fs::create_dir_all(out)?;
    let path = out.join(MASK_FILE);
    mask.save_csv(&path)?;
    info!("wrote {} walkable cells to {}", mask.len(), path.display());
    Ok(())
}

fn score(incidents: &std::path::Path, segments: &std::path::Path, out: &std::path::Path) -> Result<()> {
    let incidents = load_incidents_csv(incidents).context("loading incidents")?;
    let segments = load_segments_csv(segments).context("loading segments")?;
    info!("{} incidents, {} segments loaded", incidents.len(), segments.len());

    let scored = SafetyScorer::new(ScorerConfig::default()).score(segments, &incidents);

    std::fs::create_dir_all(out)?;
    let path = out.join(SCORED_FILE);
    save_scored_csv(&path, &scored).context("writing scored segments")?;
    info!("wrote {} scored segments to {}", scored.len(), path.display());
    Ok(())
}

fn build_graph(data: &std::path::Path, out: &std::path::Path) -> Result<()> {
    let scored = load_scored_csv(&data.join(SCORED_FILE)).context("loading scored segments")?;
    let mask = WalkabilityMask::load_csv(&data.join(MASK_FILE)).context("loading walkable mask")?;
    info!("{} scored segments, {} walkable cells", scored.len(), mask.len());

    let graph = GraphBuilder::new().build(&scored, &mask)?;
    save_graph(out, &graph).context("writing graph artifacts")?;
    Ok(())
}

fn route(config: EngineConfig, from: &str, to: &str, kind: &str, debug: bool) -> Result<()> {
    let start = parse_coord(from).context("--from")?;
    let end = parse_coord(to).context("--to")?;
    let route_kind: RouteKind = kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let handle = GraphHandle::new(config);
    let engine = handle.engine()?;

    let request = RouteRequest {
        start,
        end,
        route_kind,
        include_debug: debug,
        options: None,
    };
    match engine.route(&request) {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(e) => bail!("{}: {e}", e.kind()),
    }
}

fn parse_coord(s: &str) -> Result<Coord> {
    let Some((lat, lon)) = s.split_once(',') else {
        bail!("expected \"lat,lon\", got {s:?}");
    };
    let lat: f64 = lat.trim().parse().context("latitude")?;
    let lon: f64 = lon.trim().parse().context("longitude")?;
    Ok(Coord::new(lat, lon))
}
