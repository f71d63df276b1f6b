use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdpError {
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Parameter {key} expects {expected}, got {found}")]
    ParameterType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Shape mismatch for {name}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Grid error: {0}")]
    GridError(String),

    #[error("Physics constraint violated: {0}")]
    PhysicsViolation(String),

    #[error("Data format error: {0}")]
    DataFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SdpError {
    /// Shape check helper used wherever a caller hands in arrays.
    pub fn check_shape(name: &str, expected: &[usize], found: &[usize]) -> SdpResult<()> {
        if expected == found {
            Ok(())
        } else {
            Err(SdpError::ShapeMismatch {
                name: name.to_string(),
                expected: expected.to_vec(),
                found: found.to_vec(),
            })
        }
    }
}

pub type SdpResult<T> = Result<T, SdpError>;
