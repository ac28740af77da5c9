//! Defines fundamental types used throughout the runtime.

use std::fmt;

/// Enumerates all the errors the runtime can report. Driver authors
/// should try to map their own failures into one of these values. The
/// associated string carries the human-readable detail; for errors
/// that are reported back to the controlling peer, the string is the
/// exact text placed on the wire.

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Error {
    /// Returned whenever a resource cannot be found.
    NotFound,

    /// The peer sent a command that violates the protocol: an update
    /// to an undefined or read-only property, a missing mandatory
    /// attribute, or a batch that would break a property invariant.
    ProtocolError(String),

    /// The peer sent an element with a root tag the runtime does not
    /// recognize. This is a soft failure; the caller decides whether
    /// to log it or drop the connection.
    UnknownCommand(String),

    /// There was a problem parsing incoming text. The associated
    /// string describes how the parsing failed.
    ParseError(String),

    /// A problem with the on-disk configuration: I/O, ownership, or
    /// a malformed file.
    ConfigError(String),

    /// The requested operation couldn't complete. The description
    /// field has more information for the user. Failures on the
    /// outbound stream land here and are fatal to the driver.
    OperationError(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound => write!(f, "item not found"),
            Error::ProtocolError(v) => write!(f, "{}", &v),
            Error::UnknownCommand(v) => write!(f, "Unknown command: {}", &v),
            Error::ParseError(v) => write!(f, "parse error: {}", &v),
            Error::ConfigError(v) => write!(f, "config error: {}", &v),
            Error::OperationError(v) => {
                write!(f, "couldn't complete operation: {}", &v)
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::OperationError(format!("I/O error: {}", error))
    }
}

pub mod property;
