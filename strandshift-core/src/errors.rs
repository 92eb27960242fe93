use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnchorParseError {
    #[error("Invalid strand: {0}")]
    InvalidStrand(String),

    #[error("Invalid duplicate flag: {0}")]
    InvalidDuplicateFlag(String),

    #[error("Malformed line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("No chromosomes found in the chromosome sizes file: {0}")]
    EmptyChromSizes(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
