#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum InequalityError {
    #[error("no valid observations remain after dropping rows with NaN values or non-positive weights")]
    InsufficientData,
    #[error("failure calibrating aversion parameter: {0}")]
    Calibration(String),
    #[error("value outside of the domain of this measure: {0}")]
    Domain(String),
    #[error("sample has {values} values but {weights} weights")]
    MismatchedLengths { values: usize, weights: usize },
}
