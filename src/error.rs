use std::io;

use thiserror::Error;

use crate::platform::ParseError;

#[derive(Error, Debug)]
pub enum PlatcheckError {
    #[error("unexpected parse error for {input:?}: {source}")]
    UnexpectedParse {
        input: String,
        #[source]
        source: ParseError,
    },

    #[error(
        "round-trip mismatch for {candidate:?}: \
         first parse {first} ({first_debug}), \
         second parse {second} ({second_debug})"
    )]
    RoundTripMismatch {
        candidate: String,
        first: String,
        first_debug: String,
        second: String,
        second_debug: String,
    },

    #[error(
        "generator exhausted after {discards} discards \
         ({consecutive} consecutive, {trials_completed} trials completed); \
         the vocabulary skews too invalid for the configured limits"
    )]
    GeneratorExhausted {
        discards: u64,
        consecutive: u64,
        trials_completed: u64,
    },

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlatcheckError>;
