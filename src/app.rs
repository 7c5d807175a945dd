//! Core application

use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use anyhow::Result;
use tokio::sync::RwLock;

use crate::api::{ApiServer, AppState};
use crate::config_loader::ConfigLoader;
use crate::core::banner;
use crate::core::cli;
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::core::storage::AppStorage;
use crate::topics::TopicRegistry;

pub struct CoreApp {
    pub config: AppConfig,
    pub storage: AppStorage,
    pub shutdown: ShutdownService,
    pub state: AppState,
}

impl CoreApp {
    /// Parse CLI/env and layer config. Synchronous and run before the tokio runtime is
    /// built, so `config.server.workers` is known in time to size that runtime's worker
    /// pool (see `main.rs`) rather than only decorating the startup banner.
    pub fn bootstrap() -> Result<AppConfig> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let cli_config = cli::parse();
        AppConfig::load(&cli_config)
    }

    /// Run the application against an already-loaded configuration.
    pub async fn run(config: AppConfig) -> Result<()> {
        let app = Self::init(config).await?;
        Self::start_server(app).await
    }

    async fn init(config: AppConfig) -> Result<Self> {
        let storage = AppStorage::init(config.debug).await?;

        let registry = Arc::new(TopicRegistry::new());
        let loader = Arc::new(ConfigLoader::new(registry.clone(), config.inbox_capacity));
        let shutdown = ShutdownService::new(loader.clone());

        let state = AppState {
            registry,
            loader,
            topology_lock: Arc::new(RwLock::new(())),
            storage: Arc::new(storage.clone()),
            debug: config.debug,
            upload_seq: Arc::new(AtomicU64::new(0)),
        };

        Ok(Self {
            config,
            storage,
            shutdown,
            state,
        })
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        banner::print_banner(
            &app.config.server.host,
            app.config.server.port,
            app.config.server.workers,
            &app.storage.data_dir().display().to_string(),
        );

        let shutdown = app.shutdown.clone();
        let server = ApiServer::new(app);
        server.start().await?;
        shutdown.shutdown().await;

        Ok(())
    }
}
