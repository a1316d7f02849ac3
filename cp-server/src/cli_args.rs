use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// runs the catalog server
    RunServer {
        #[arg(long, env("DB_PATH"))]
        db_path: PathBuf,
        #[arg(long, env("JSON_PATH"))]
        fixture_path: PathBuf,
        #[arg(long, env("HTTP_PORT"), default_value_t = 8000)]
        http_port: u16,
    },
}
