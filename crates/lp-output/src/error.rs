use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// The store could not be projected (a broken pair, usually).
    #[error("plan error: {0}")]
    Plan(#[from] lp_plan::PlanError),
}

pub type OutputResult<T> = Result<T, OutputError>;
