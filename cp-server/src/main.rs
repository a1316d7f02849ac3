use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{event, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cp_server::app::{build_router, AppState};
use cp_server::cli_args::{Cli, Commands};
use cp_server::configuration::ServiceConfiguration;
use cp_store::{get_sqlite_connection_pool, seed_from_fixture, DbBmc, DbModelManager};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    match args {
        Cli { command } => match command {
            Commands::RunServer { .. } => {
                tracing_subscriber::registry()
                    .with(fmt::layer())
                    .with(EnvFilter::from_default_env())
                    .init();

                let cfg = ServiceConfiguration::new(command);

                let pool = get_sqlite_connection_pool(&cfg.db_path).await?;
                let mm = DbModelManager::new(pool);

                if let Err(e) = seed_from_fixture(&mm, &cfg.fixture_path).await {
                    event!(Level::ERROR, "Seeding failed, refusing to start: {:#}", e);
                    std::process::exit(1);
                }

                let state = AppState {
                    bmc: Arc::new(DbBmc::new(mm)),
                };

                let app = build_router(state);

                let addr = format!("0.0.0.0:{}", cfg.http_port);
                let listener = tokio::net::TcpListener::bind(&addr).await?;
                event!(Level::INFO, "listening on http://{}", addr);

                axum::serve(listener, app.into_make_service()).await?;

                Ok(())
            }
        },
    }
}
