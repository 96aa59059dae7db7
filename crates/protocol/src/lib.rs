//! Wire protocol for the cellview arena client.
//!
//! This crate contains:
//! - Bounds-checked binary reading/writing utilities
//! - Inbound (server -> client) packet decoding
//! - Outbound (client -> server) packet encoding
//! - Shared types (Color, Position)

mod binary;
mod error;
pub mod packets;

pub use binary::{BinaryReader, BinaryWriter};
pub use error::ProtocolError;

/// RGB color used for cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` form, as used by canvas-style renderers.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// World-space position. Coordinates travel as f64 on the wire.
pub type Position = glam::DVec2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_pads_components() {
        assert_eq!(Color::new(0, 10, 255).to_hex(), "#000aff");
    }
}
