//! Packet definitions for the arena protocol.
//!
//! `server` decodes what the server sends, `client` encodes what we send.

mod client;
mod server;

pub use client::*;
pub use server::*;

/// Opcodes for client -> server packets.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientOpcode {
    /// Join game with nickname.
    Join = 0,
    /// Request spectate mode.
    Spectate = 1,
    /// Position intent (mouse target in world space).
    Target = 16,
    /// Split / primary action start.
    Split = 17,
    /// Secondary action start (Q down).
    SecondaryStart = 18,
    /// Secondary action stop (Q up, focus loss).
    SecondaryStop = 19,
    /// Eject mass (W key).
    Eject = 21,
    /// Connection handshake, first message only.
    Handshake = 255,
}

/// Opcodes for server -> client packets.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerOpcode {
    /// World update (eats, cell records, liveness manifest).
    WorldUpdate = 16,
    /// Camera hint while not owning any cell.
    SelfPosition = 17,
    /// Lost every owned cell.
    ClearOwned = 20,
    /// Cell id about to be owned.
    AddOwned = 32,
    /// Leaderboard (id + name list).
    Leaderboard = 49,
    /// Visible world box while spectating.
    SpectateBounds = 64,
}

impl TryFrom<u8> for ServerOpcode {
    type Error = crate::ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            16 => Self::WorldUpdate,
            17 => Self::SelfPosition,
            20 => Self::ClearOwned,
            32 => Self::AddOwned,
            49 => Self::Leaderboard,
            64 => Self::SpectateBounds,
            other => return Err(crate::ProtocolError::UnknownOpcode(other)),
        })
    }
}
