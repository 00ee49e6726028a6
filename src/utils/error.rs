use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("could not infer dashboard UID from {url}")]
    MissingDashboardUid { url: String },

    #[error("dashboard lookup response has no dashboard field")]
    MissingDashboardField,

    #[error("conversion module error: {message}")]
    ModuleError { message: String },

    #[error("conversion module does not export {export}")]
    MissingModuleExport { export: &'static str },

    #[error("conversion channel is closed")]
    ChannelClosed,

    #[error("conversion request {id} was abandoned without a response")]
    ConversionAbandoned { id: u64 },
}

pub type Result<T> = std::result::Result<T, ExportError>;
