//! Client -> Server packet encoding.

use bytes::Bytes;

use super::ClientOpcode;
use crate::BinaryWriter;

/// Outbound packet.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientPacket {
    /// Handshake (255) with protocol version. Must be the first message.
    Handshake { version: u32 },
    /// Join game (0) with nickname.
    Join { name: String },
    /// Position intent (16): world-space target.
    Target { x: f64, y: f64 },
    /// Spectate mode (1).
    Spectate,
    /// Split (17).
    Split,
    /// Secondary action start (18).
    SecondaryStart,
    /// Secondary action stop (19).
    SecondaryStop,
    /// Eject mass (21).
    Eject,
}

impl ClientPacket {
    pub fn opcode(&self) -> ClientOpcode {
        match self {
            Self::Handshake { .. } => ClientOpcode::Handshake,
            Self::Join { .. } => ClientOpcode::Join,
            Self::Target { .. } => ClientOpcode::Target,
            Self::Spectate => ClientOpcode::Spectate,
            Self::Split => ClientOpcode::Split,
            Self::SecondaryStart => ClientOpcode::SecondaryStart,
            Self::SecondaryStop => ClientOpcode::SecondaryStop,
            Self::Eject => ClientOpcode::Eject,
        }
    }

    /// Encode into the fixed wire layout.
    pub fn encode(&self) -> Bytes {
        let opcode = self.opcode() as u8;
        match self {
            Self::Handshake { version } => {
                let mut w = BinaryWriter::with_capacity(5);
                w.put_u8(opcode);
                w.put_u32(*version);
                w.finish()
            }
            Self::Join { name } => {
                // Name units fill the rest of the frame, no terminator.
                let mut w = BinaryWriter::with_capacity(1 + 2 * name.len());
                w.put_u8(opcode);
                w.put_utf16_units(name);
                w.finish()
            }
            Self::Target { x, y } => {
                let mut w = BinaryWriter::with_capacity(21);
                w.put_u8(opcode);
                w.put_f64(*x);
                w.put_f64(*y);
                w.put_u32(0);
                w.finish()
            }
            Self::Spectate | Self::Split | Self::SecondaryStart | Self::SecondaryStop | Self::Eject => {
                Bytes::copy_from_slice(&[opcode])
            }
        }
    }
}
