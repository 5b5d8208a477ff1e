//! Error types for whatday.

use thiserror::Error;

/// Errors that can occur in whatday operations.
#[derive(Error, Debug)]
pub enum WhatDayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Could not fetch calendar: {0}")]
    Transport(String),

    #[error("No events found in calendar")]
    NoEventsFound,

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Event id '{0}' is ambiguous, type more characters")]
    AmbiguousId(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid time '{0}'. Expected HH:MM")]
    InvalidTime(String),

    #[error("No speech backend found. Install espeak-ng or set speech_command in the config")]
    SpeechUnavailable,

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for whatday operations.
pub type WhatDayResult<T> = Result<T, WhatDayError>;
