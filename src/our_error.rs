use thiserror::Error;

#[derive(Error, Debug)]
pub enum OurError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    // the juicy_bencode error borrows the input, we only keep the message
    #[error("Not a valid bencoded torrent: {0}")]
    MalformedBencode(String),

    // stupid ass bendy library's error type only implements Debug + Display and not actually Error
    #[error("Bendy complained {0}")]
    BendyDecodeError(String),

    #[error("Torrent metadata is missing `{0}`")]
    MissingField(&'static str),

    #[error("Torrent metadata field `{field}` {expected}")]
    InvalidField { field: &'static str, expected: &'static str },

    #[error("Piece size must be positive, got {0}")]
    InvalidPieceSize(i64),

    #[error("Invalid session configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, OurError>;
