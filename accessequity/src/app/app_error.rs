use accessequity_metrics::InequalityError;
use accessequity_siting::SitingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("failure reading run configuration: {0}")]
    ConfigurationError(String),
    #[error("{msg}: {source}")]
    ConfigReadError {
        msg: String,
        source: config::ConfigError,
    },
    #[error("failed reading '{filepath}': {error}")]
    ReadError { filepath: String, error: String },
    #[error("failed writing '{filepath}': {error}")]
    WriteError { filepath: String, error: String },
    #[error("failure computing equity measure: {source}")]
    InequalityError {
        #[from]
        source: InequalityError,
    },
    #[error("failure running facility siting: {source}")]
    SitingError {
        #[from]
        source: SitingError,
    },
    #[error("failure processing CSV: {source}")]
    CsvError {
        #[from]
        source: csv::Error,
    },
    #[error("failure with file system: {source}")]
    StdIoError {
        #[from]
        source: std::io::Error,
    },
    #[error("{0}")]
    InternalError(String),
}
