use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shinee_collection_server::collection_store::SqliteCollectionStore;
use shinee_collection_server::config::FileConfig;
use shinee_collection_server::image_store::{ImageStore, SupabaseImageStore};
use shinee_collection_server::server::{run_server, RequestsLoggingLevel, ServerConfig};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite collection database file.
    #[clap(value_parser = parse_path)]
    pub collection_db: PathBuf,

    /// Path to an optional TOML config file.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long)]
    pub port: Option<u16>,

    /// The level of logging to perform on each request.
    #[clap(long)]
    pub logging_level: Option<RequestsLoggingLevel>,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Base URL of the image storage service.
    #[clap(long, env = "SB_URL")]
    pub storage_url: Option<String>,

    /// Service role key for the image storage service.
    #[clap(long, env = "SB_KEY", hide_env_values = true)]
    pub storage_api_key: Option<String>,

    /// Image storage bucket name.
    #[clap(long)]
    pub storage_bucket: Option<String>,

    /// Timeout in seconds for image storage requests.
    #[clap(long)]
    pub storage_timeout_sec: Option<u64>,
}

const DEFAULT_STORAGE_BUCKET: &str = "RandomItem";
const DEFAULT_STORAGE_TIMEOUT_SEC: u64 = 60;

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

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

    let file_config = match &cli_args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    let file_logging_level = file_config
        .logging_level
        .as_deref()
        .map(|value| {
            <RequestsLoggingLevel as clap::ValueEnum>::from_str(value, true)
                .map_err(|err| anyhow::anyhow!("Invalid logging_level in config file: {}", err))
        })
        .transpose()?;

    let config = ServerConfig {
        port: cli_args
            .port
            .or(file_config.port)
            .unwrap_or(ServerConfig::default().port),
        requests_logging_level: cli_args
            .logging_level
            .or(file_logging_level)
            .unwrap_or_default(),
        frontend_dir_path: cli_args
            .frontend_dir_path
            .or(file_config.frontend_dir_path),
    };

    info!(
        "Opening collection database at {:?}...",
        cli_args.collection_db
    );
    let collection_store = Arc::new(SqliteCollectionStore::new(&cli_args.collection_db)?);
    info!(
        "Opened collection: {} discs, {} editions, {} random items",
        collection_store.disc_count(),
        collection_store.edition_count(),
        collection_store.random_item_count()
    );

    let file_storage = file_config.storage.unwrap_or_default();
    let storage_url = cli_args.storage_url.or(file_storage.url);
    let storage_api_key = cli_args.storage_api_key.or(file_storage.api_key);
    let image_store: Option<Arc<dyn ImageStore>> = match (storage_url, storage_api_key) {
        (Some(url), Some(api_key)) => {
            let bucket = cli_args
                .storage_bucket
                .or(file_storage.bucket)
                .unwrap_or_else(|| DEFAULT_STORAGE_BUCKET.to_string());
            let timeout_sec = cli_args
                .storage_timeout_sec
                .or(file_storage.timeout_sec)
                .unwrap_or(DEFAULT_STORAGE_TIMEOUT_SEC);
            info!("Image storage configured: {} (bucket {})", url, bucket);
            Some(Arc::new(SupabaseImageStore::new(
                url,
                api_key,
                bucket,
                timeout_sec,
            )))
        }
        _ => {
            warn!("No image storage configured; random item uploads will answer 503");
            None
        }
    };

    run_server(config, collection_store, image_store).await
}
