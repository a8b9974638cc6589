use thiserror::Error;

#[derive(Error, Debug)]
pub enum VizError {
    #[error("unknown chart: {0}")]
    UnknownChart(String),
    #[error("row index {index} is out of range for a dataset of {rows} rows")]
    RowIndexOutOfRange { index: usize, rows: usize },
    #[error("malformed Blood_Pressure {value:?} at row {row}: {reason}")]
    Parse {
        row: usize,
        value: String,
        reason: String,
    },
    #[error("column {0} has a zero range and cannot be standardized")]
    DegenerateRange(String),
    #[error("dataset is missing required column: {0}")]
    MissingColumn(String),
    #[error("column {0} has no values")]
    EmptyColumn(String),
    #[error("dataset has not been loaded")]
    NotLoaded,
    #[error("failed to read dataset: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("rendering failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, VizError>;
