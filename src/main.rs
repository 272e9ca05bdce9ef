use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catenella::walk::{
    ChainWalker, DriftingWeight, PopularWeight, SimilarWeight, WalkError, WalkPolicy,
    WeightStrategy,
};
use catenella::{CatalogGateway, Playlist, SpotifyGateway};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Weighting {
    /// Favor popular tracks by popular artists.
    Popular,
    /// Stay sonically close to the previously picked track.
    Similar,
    /// Drift away from the seed while staying close to the previous track.
    Drifting,
}

impl Weighting {
    fn strategy(self) -> Box<dyn WeightStrategy> {
        match self {
            Weighting::Popular => Box::new(PopularWeight),
            Weighting::Similar => Box::new(SimilarWeight),
            Weighting::Drifting => Box::new(DriftingWeight),
        }
    }
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// ID of the seed track the walk starts from.
    #[clap(long)]
    seed: String,

    /// Number of tracks in the generated playlist, seed included.
    #[clap(long, default_value_t = 20)]
    size: usize,

    /// Name of the generated playlist.
    #[clap(long, default_value = "catenella")]
    name: String,

    /// Weighting strategy for the walk.
    #[clap(long, value_enum, default_value_t = Weighting::Drifting)]
    weighting: Weighting,

    /// Allow the walk to pick several tracks from the same artist.
    #[clap(long)]
    allow_repeated_artists: bool,

    /// Allow the walk to pick the same track more than once.
    #[clap(long)]
    allow_repeated_tracks: bool,

    /// Fixed RNG seed, for reproducible walks.
    #[clap(long)]
    rng_seed: Option<u64>,

    /// Write the playlist JSON to this file instead of stdout.
    #[clap(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let gateway: Arc<dyn CatalogGateway> = Arc::new(SpotifyGateway::from_env()?);

    let seed_track = gateway
        .fetch_track(&args.seed)
        .with_context(|| format!("failed to fetch seed track {}", args.seed))?;
    info!("Walking from {} ({})", seed_track.name, seed_track.id);

    let policy = WalkPolicy {
        unique_artists: !args.allow_repeated_artists,
        unique_tracks: !args.allow_repeated_tracks,
    };
    let mut walker = match args.rng_seed {
        Some(rng_seed) => ChainWalker::seeded(
            gateway,
            seed_track,
            args.weighting.strategy(),
            policy,
            rng_seed,
        )?,
        None => ChainWalker::new(gateway, seed_track, args.weighting.strategy(), policy)?,
    };

    let mut playlist = Playlist::new(&args.name);
    while playlist.len() < args.size {
        match walker.advance() {
            Ok(track) => {
                info!("Adding {} to the playlist", track.name);
                playlist.push(track);
            }
            Err(err @ WalkError::NoCandidates { .. }) => {
                // Usually a sign of uniqueness settings too strict for the
                // neighbourhood; hand over what we have.
                warn!("Walk ended after {} tracks: {}", playlist.len(), err);
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    info!("Finished generating playlist {playlist}");

    let json = serde_json::to_string_pretty(&playlist)?;
    match &args.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("failed to write playlist to {}", path.display()))?,
        None => println!("{json}"),
    }

    Ok(())
}
