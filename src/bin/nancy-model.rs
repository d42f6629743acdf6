//! Offline model tooling: dataset import and artifact build.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use nancy::{
    config::Config,
    services::{dataset, model_store, SimilarityModel, TmdbClient},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nancy-model")]
#[command(version)]
#[command(about = "Build and import data for the Nancy recommendation model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit TF-IDF over a dataset and write the model artifacts
    Build {
        /// Movie dataset (.json array or .csv)
        #[arg(short, long)]
        input: PathBuf,

        /// Artifact directory (defaults to MODEL_DIR)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Download popular movies from TMDB into a JSON dataset
    FetchTmdb {
        /// Number of popular-list pages to fetch (20 movies each)
        #[arg(short, long, default_value = "5")]
        pages: u32,

        /// Dataset file to write
        #[arg(short, long, default_value = "movies.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nancy=info,nancy_model=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Build { input, out } => {
            let out = out.unwrap_or_else(|| config.model_dir.clone());
            let movies = dataset::load(&input)?;
            if movies.is_empty() {
                anyhow::bail!("dataset {} contains no movies", input.display());
            }

            let model = SimilarityModel::build(movies);
            model_store::save(&model, &out)?;
            tracing::info!(
                out = %out.display(),
                movie_count = model.len(),
                titles = model.title_index.len(),
                "Model artifacts written"
            );
        }

        Commands::FetchTmdb { pages, output } => {
            let api_key = config
                .tmdb_api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("TMDB_API_KEY must be set"))?;

            let client = TmdbClient::new(api_key, config.tmdb_api_url.clone());
            let movies = client.fetch_popular(pages).await?;
            dataset::save_json(&movies, &output)?;
            tracing::info!(
                output = %output.display(),
                movie_count = movies.len(),
                "Dataset written"
            );
        }
    }

    Ok(())
}
