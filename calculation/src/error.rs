use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalculationError {
    #[error("invalid calculator registration: {0}")]
    InvalidRegistration(&'static str),
    #[error("calculator type `{calculator}` is not registered")]
    NotRegistered { calculator: String },
    #[error("method `{method}` does not exist for type `{calculator}`")]
    MissingMethod { calculator: String, method: String },
    /// Error raised by the calculator method itself, passed through untouched.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}
