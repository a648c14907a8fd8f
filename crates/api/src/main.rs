use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tasks_api::config::{ServerConfig, StorageConfig};
use tasks_api::server::Server;
use tasks_api::state::AppState;
use tasks_core::{BoxError, TaskRepository, TaskService};
use tasks_db::{PgTaskRepository, SqliteTaskRepository};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasks_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "fatal: invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(host = %config.host, port = config.port, "loaded server configuration");

    let repo = match connect_storage(&config.storage).await {
        Ok(repo) => repo,
        Err(err) => {
            tracing::error!(error = %err, "fatal: could not set up storage");
            return ExitCode::FAILURE;
        }
    };

    let state = AppState {
        tasks: Arc::new(TaskService::new(repo)),
    };

    let server = match Server::new(state, &config) {
        Ok(server) => server,
        Err(err) => {
            tracing::error!(error = %err, "fatal: could not build server");
            return ExitCode::FAILURE;
        }
    };

    let bound = match server.bind().await {
        Ok(bound) => bound,
        Err(err) => {
            tracing::error!(error = %err, "fatal: could not start server");
            return ExitCode::FAILURE;
        }
    };

    match bound.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "server failed");
            ExitCode::FAILURE
        }
    }
}

/// Wire up the storage backend selected by configuration. Any failure here
/// is fatal: the process cannot proceed without storage.
async fn connect_storage(storage: &StorageConfig) -> Result<Arc<dyn TaskRepository>, BoxError> {
    match storage {
        StorageConfig::Sqlite { data_dir } => {
            tokio::fs::create_dir_all(data_dir).await?;
            let datafile = data_dir.join("tasks.db");
            tracing::info!(file = %datafile.display(), "opening sqlite data file");
            let repo = SqliteTaskRepository::connect(&datafile).await?;
            tracing::info!("sqlite storage set up");
            Ok(Arc::new(repo))
        }
        StorageConfig::Postgres { url } => {
            tracing::info!("connecting to postgres");
            let repo = PgTaskRepository::connect(url).await?;
            tracing::info!("postgres storage set up");
            Ok(Arc::new(repo))
        }
    }
}
