mod app_error;
mod equity_cli;
mod equity_config;
pub mod evaluate;
mod measure_row;
pub mod optimize;
pub mod table_io;

pub use app_error::AppError;
pub use equity_cli::{EquityCliArguments, EquityOperation};
pub use equity_config::EquityConfig;
pub use measure_row::{find_measure, MeasureRow};
