use thiserror::Error;

/// Error types for the enzkin-rs library.
#[derive(Error, Debug)]
pub enum KineticsError {
    /// The experiment declares neither substrate nor product measurements.
    #[error("Unknown stoichiometry '{0}': define whether measured data is \"substrate\" or \"product\" data")]
    UnknownStoichiometry(String),

    /// A substrate or product concentration is negative after mass-balance closure.
    #[error("{array} data contains negative concentrations (first at row {row}, time index {column}: {value}). Check data.")]
    NegativeConcentration {
        array: &'static str,
        row: usize,
        column: usize,
        value: f64,
    },

    /// A requested initial substrate concentration is not part of the dataset.
    #[error("{requested} not found in initial substrate concentrations. Initial substrate concentrations are {known:?}")]
    UnknownInitialSubstrate { requested: f64, known: Vec<f64> },

    /// Subsetting left no rows or no time points to fit.
    #[error("Empty selection: {0}")]
    EmptySelection(String),

    /// Arrays whose shapes must agree do not.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Input data that cannot be used for estimation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The ODE integrator failed or produced non-finite states.
    #[error("Integration failed: {0}")]
    Integration(String),

    /// Error indicating the algorithm failed to converge.
    #[error("Algorithm failed to converge: {0}")]
    ConvergenceFailure(String),

    /// Error indicating a singular matrix was encountered.
    #[error("Singular matrix encountered: {0}")]
    SingularMatrix(String),

    /// Error for parameter-related problems.
    #[error("Parameter error: {0}")]
    ParameterError(#[from] crate::parameters::ParameterError),

    /// Error for boundary constraint violations.
    #[error("Bounds error: {0}")]
    BoundsError(#[from] crate::parameters::BoundsError),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for enzkin-rs operations.
pub type Result<T> = std::result::Result<T, KineticsError>;
