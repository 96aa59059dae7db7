//! Protocol error types.

use thiserror::Error;

/// Errors that can occur while decoding a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Empty frame")]
    EmptyFrame,

    #[error("Unknown packet opcode: {0}")]
    UnknownOpcode(u8),

    #[error("Unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("String ran past the end of the frame")]
    UnterminatedString,
}
