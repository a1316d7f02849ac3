pub mod bmc;
pub mod db;
pub mod db_model_manager;
pub mod error;
pub mod seed;

pub use bmc::*;
pub use db::*;
pub use db_model_manager::*;
pub use error::*;
pub use seed::*;
