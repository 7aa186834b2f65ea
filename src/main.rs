use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use beans::clock::SystemClock;
use beans::config::FileConfig;
use beans::server::{AppState, create_router};
use beans::store::{SnapshotStore, SqliteSnapshotStore, persist, run_autosave_loop};
use beans::workspace::Workspace;

#[derive(Parser)]
#[command(name = "beans")]
#[command(about = "A messaging workspace server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// TOML configuration file. Flags override its values.
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the snapshot database
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Seconds between snapshot saves (0 disables autosave)
        #[arg(long)]
        autosave_interval: Option<u64>,
    },
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate());
        match sigterm {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("beans=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            host,
            port,
            data_dir,
            autosave_interval,
        } => {
            let FileConfig {
                server: mut server_config,
                workspace: workspace_config,
            } = match config {
                Some(path) => FileConfig::load(&path)?,
                None => FileConfig::default(),
            };
            if let Some(host) = host {
                server_config.host = host;
            }
            if let Some(port) = port {
                server_config.port = port;
            }
            if let Some(data_dir) = data_dir {
                server_config.data_dir = data_dir;
            }
            if let Some(secs) = autosave_interval {
                server_config.autosave_interval_secs = secs;
            }

            fs::create_dir_all(&server_config.data_dir)?;
            let store = SqliteSnapshotStore::new(server_config.db_path())?;
            store.initialize()?;
            let store: Arc<dyn SnapshotStore> = Arc::new(store);

            let workspace = match store.load()? {
                Some(snapshot) => {
                    info!("Restored workspace saved at {}", snapshot.saved_at);
                    Workspace::with_state(workspace_config, Arc::new(SystemClock), snapshot.state)?
                }
                None => Workspace::new(workspace_config, Arc::new(SystemClock))?,
            };
            workspace.rearm();

            if server_config.autosave_interval_secs > 0 {
                tokio::spawn(run_autosave_loop(
                    workspace.clone(),
                    store.clone(),
                    server_config.autosave_interval_secs,
                ));
            }

            let state = Arc::new(AppState::new(workspace.clone()).with_snapshots(store.clone()));
            let app = create_router(state);
            let addr = server_config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            persist(&workspace, store.as_ref())?;
            info!("Workspace saved to {}", server_config.db_path().display());
        }
    }

    Ok(())
}
