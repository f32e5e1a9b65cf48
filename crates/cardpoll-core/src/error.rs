use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Identity errors
    #[error("Invalid reader ID: {id}")]
    InvalidReaderId { id: u8 },

    // Card errors
    #[error("Invalid card UID: {0}")]
    InvalidUid(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
