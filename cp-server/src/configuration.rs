use std::path::PathBuf;

use crate::cli_args::Commands;

#[derive(Debug)]
pub struct ServiceConfiguration {
    pub db_path: PathBuf,
    pub fixture_path: PathBuf,
    pub http_port: u16,
}

impl ServiceConfiguration {
    pub fn new(commands: Commands) -> Self {
        match commands {
            Commands::RunServer {
                db_path,
                fixture_path,
                http_port,
            } => Self {
                db_path,
                fixture_path,
                http_port,
            },
        }
    }
}
