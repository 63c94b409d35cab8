/// Domain errors raised while decoding diagnostic output or device lists.
///
/// Every variant is recoverable at the narrowest unit of work: a bad line
/// drops that line, a bad primary reading drops that reading. Only
/// [`CoreError::Config`] is meant to abort startup.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid {field} '{value}' for sensor {sensor}")]
    InvalidNumber {
        sensor: String,
        field: &'static str,
        value: String,
    },

    #[error("Unknown measurement kind '{kind}' for sensor {sensor}")]
    UnknownKind { sensor: String, kind: String },

    #[error("Invalid main reading: {0}")]
    InvalidMainReading(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
