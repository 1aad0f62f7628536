/// Errors that abort loading of a single measurement file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// I/O error while reading from disk
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No text encoding in the fallback chain could decode the bytes
    #[error("could not decode file as UTF-8, UTF-16, Latin-1 or Windows-1252")]
    Decode,

    /// Extension or hint names no known parser
    #[error("unsupported file format: {0} (use .result or a delimited text file such as .csv)")]
    UnsupportedFormat(String),

    /// Parsing finished without a single valid (frequency, amplitude) pair
    #[error("no numeric (frequency, amplitude) pairs found")]
    EmptyResult,
}
