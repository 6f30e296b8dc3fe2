use thiserror::Error;

/// Result type alias for operations that may fail with [`MonotraceError`].
pub type MonotraceResult<T> = std::result::Result<T, MonotraceError>;

/// Error types that can occur while converting and tracing images.
///
/// This enum covers errors from image I/O, the PBM codec, bitmap processing
/// and vectorization.
#[derive(Debug, Error)]
pub enum MonotraceError {
    /// Image loading, decoding, or encoding error.
    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),
    /// File system I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Malformed or unsupported PBM data.
    #[error("Invalid PBM data: {0}")]
    Pbm(String),
    /// Vectorization or tracing operation failed.
    #[error("Tracing failed: {0}")]
    Trace(String),
    /// An external tracing program could not be started.
    #[error("Tracing program `{program}` could not be started: {source}")]
    ToolNotFound {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// A color specification could not be parsed.
    #[error("Invalid color `{0}`; expected #rgb, #rrggbb, white or black")]
    InvalidColor(String),
}
