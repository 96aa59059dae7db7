//! Server -> Client packet decoding.
//!
//! [`ServerPacket::parse`] turns one frame into one typed packet. The
//! `build_*` functions produce the same layouts and are used by tests and
//! local mock servers.

use bytes::Bytes;

use super::ServerOpcode;
use crate::{BinaryReader, BinaryWriter, Color, Position, ProtocolError};

/// Cell flag bits carried by each world-update record.
pub mod cell_flags {
    /// The cell is a virus.
    pub const VIRUS: u8 = 0x01;
    /// Reserved extension: 4 bytes follow.
    pub const EXT_4: u8 = 0x02;
    /// Reserved extension: 8 bytes follow.
    pub const EXT_8: u8 = 0x04;
    /// Reserved extension: 16 bytes follow.
    pub const EXT_16: u8 = 0x08;
}

/// Eat record: `eater_id` absorbed `eaten_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EatRecord {
    pub eater_id: u32,
    pub eaten_id: u32,
}

/// One cell record of a world update.
#[derive(Debug, Clone, PartialEq)]
pub struct CellRecord {
    pub id: u32,
    pub position: Position,
    pub size: f64,
    pub color: Color,
    /// Raw flag byte; see [`cell_flags`].
    pub flags: u8,
    pub name: String,
}

impl CellRecord {
    #[inline]
    pub fn is_virus(&self) -> bool {
        self.flags & cell_flags::VIRUS != 0
    }

    /// Bytes of reserved extension data that follow the flag byte.
    #[inline]
    pub fn extension_len(&self) -> usize {
        extension_len(self.flags)
    }
}

#[inline]
fn extension_len(flags: u8) -> usize {
    let mut len = 0;
    if flags & cell_flags::EXT_4 != 0 {
        len += 4;
    }
    if flags & cell_flags::EXT_8 != 0 {
        len += 8;
    }
    if flags & cell_flags::EXT_16 != 0 {
        len += 16;
    }
    len
}

/// Decoded world update (opcode 16).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldUpdate {
    /// Consumption pairs, in wire order.
    pub eats: Vec<EatRecord>,
    /// Cell records, in wire order (sentinel excluded).
    pub cells: Vec<CellRecord>,
    /// Liveness manifest: ids the server still considers alive.
    pub alive: Vec<u32>,
}

/// Leaderboard entry (opcode 49).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub id: u32,
    pub name: String,
}

/// Axis-aligned world box (opcode 64).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl WorldBounds {
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Midpoint of the box.
    #[inline]
    pub fn center(&self) -> Position {
        Position::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self::new(0.0, 0.0, 10_000.0, 10_000.0)
    }
}

/// Parsed server packet.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerPacket {
    /// World update (16).
    WorldUpdate(WorldUpdate),
    /// Camera hint while spectating (17). `scale` is carried but unused.
    SelfPosition { x: f64, y: f64, scale: f64 },
    /// All owned cells lost (20).
    ClearOwned,
    /// Ownership claim for a cell id (32).
    AddOwned(u32),
    /// Full leaderboard replacement (49).
    Leaderboard(Vec<LeaderboardEntry>),
    /// Spectate bounds (64).
    SpectateBounds(WorldBounds),
}

impl ServerPacket {
    /// Parse one server frame.
    ///
    /// Unknown opcodes and truncated payloads are errors; trailing bytes
    /// after a complete payload are ignored.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        Self::parse_bytes(Bytes::copy_from_slice(data))
    }

    /// Parse a frame the transport already owns, without copying it.
    pub fn parse_bytes(data: Bytes) -> Result<Self, ProtocolError> {
        if data.is_empty() {
            return Err(ProtocolError::EmptyFrame);
        }

        let mut reader = BinaryReader::new(data);
        let opcode = ServerOpcode::try_from(reader.read_u8()?)?;

        match opcode {
            ServerOpcode::WorldUpdate => parse_world_update(&mut reader).map(Self::WorldUpdate),
            ServerOpcode::SelfPosition => {
                let x = reader.read_f64()?;
                let y = reader.read_f64()?;
                let scale = reader.read_f64()?;
                Ok(Self::SelfPosition { x, y, scale })
            }
            ServerOpcode::ClearOwned => Ok(Self::ClearOwned),
            ServerOpcode::AddOwned => Ok(Self::AddOwned(reader.read_u32()?)),
            ServerOpcode::Leaderboard => {
                let count = reader.read_u32()? as usize;
                // Each entry is at least id + terminator.
                let mut entries = Vec::with_capacity(count.min(reader.remaining() / 6));
                for _ in 0..count {
                    let id = reader.read_u32()?;
                    let name = reader.read_string_unicode()?;
                    entries.push(LeaderboardEntry { id, name });
                }
                Ok(Self::Leaderboard(entries))
            }
            ServerOpcode::SpectateBounds => {
                let min_x = reader.read_f64()?;
                let min_y = reader.read_f64()?;
                let max_x = reader.read_f64()?;
                let max_y = reader.read_f64()?;
                Ok(Self::SpectateBounds(WorldBounds::new(min_x, min_y, max_x, max_y)))
            }
        }
    }
}

/// Parse the 16 payload.
///
/// Wire format:
///   u16  eat_count
///   [u32 eater_id, u32 eaten_id] x eat_count
///   loop:
///     u32  id                 - 0 terminates the loop
///     f64  x, f64 y, f64 size
///     u8   reserved, u8 r, u8 g, u8 b
///     u8   flags              - bit0 virus; bits 1..3 prefix 4/8/16 reserved bytes
///     u16* name               - zero terminated
///   u16  reserved
///   u32  alive_count
///   [u32 id] x alive_count
fn parse_world_update(reader: &mut BinaryReader) -> Result<WorldUpdate, ProtocolError> {
    let eat_count = reader.read_u16()? as usize;
    let mut eats = Vec::with_capacity(eat_count.min(reader.remaining() / 8));
    for _ in 0..eat_count {
        let eater_id = reader.read_u32()?;
        let eaten_id = reader.read_u32()?;
        eats.push(EatRecord { eater_id, eaten_id });
    }

    let mut cells = Vec::new();
    loop {
        let id = reader.read_u32()?;
        if id == 0 {
            break;
        }
        let x = reader.read_f64()?;
        let y = reader.read_f64()?;
        let size = reader.read_f64()?;
        reader.skip(1)?;
        let r = reader.read_u8()?;
        let g = reader.read_u8()?;
        let b = reader.read_u8()?;
        let flags = reader.read_u8()?;
        reader.skip(extension_len(flags))?;
        let name = reader.read_string_unicode()?;

        cells.push(CellRecord {
            id,
            position: Position::new(x, y),
            size,
            color: Color::new(r, g, b),
            flags,
            name,
        });
    }

    reader.skip(2)?;
    let alive_count = reader.read_u32()? as usize;
    let mut alive = Vec::with_capacity(alive_count.min(reader.remaining() / 4));
    for _ in 0..alive_count {
        alive.push(reader.read_u32()?);
    }

    Ok(WorldUpdate { eats, cells, alive })
}

/// Build a WorldUpdate packet (16). Extension bytes are written as zeros.
pub fn build_world_update(update: &WorldUpdate) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(64 + update.cells.len() * 48);
    w.put_u8(ServerOpcode::WorldUpdate as u8);

    w.put_u16(update.eats.len() as u16);
    for eat in &update.eats {
        w.put_u32(eat.eater_id);
        w.put_u32(eat.eaten_id);
    }

    for cell in &update.cells {
        w.put_u32(cell.id);
        w.put_f64(cell.position.x);
        w.put_f64(cell.position.y);
        w.put_f64(cell.size);
        w.put_u8(0);
        w.put_u8(cell.color.r);
        w.put_u8(cell.color.g);
        w.put_u8(cell.color.b);
        w.put_u8(cell.flags);
        w.put_slice(&vec![0u8; cell.extension_len()]);
        w.put_string_unicode(&cell.name);
    }
    w.put_u32(0);

    w.put_u16(0);
    w.put_u32(update.alive.len() as u32);
    for &id in &update.alive {
        w.put_u32(id);
    }
    w
}

/// Build a SelfPosition packet (17).
pub fn build_self_position(x: f64, y: f64, scale: f64) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(25);
    w.put_u8(ServerOpcode::SelfPosition as u8);
    w.put_f64(x);
    w.put_f64(y);
    w.put_f64(scale);
    w
}

/// Build a ClearOwned packet (20).
pub fn build_clear_owned() -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(1);
    w.put_u8(ServerOpcode::ClearOwned as u8);
    w
}

/// Build an AddOwned packet (32).
pub fn build_add_owned(id: u32) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(5);
    w.put_u8(ServerOpcode::AddOwned as u8);
    w.put_u32(id);
    w
}

/// Build a Leaderboard packet (49).
pub fn build_leaderboard(entries: &[LeaderboardEntry]) -> BinaryWriter {
    let mut w = BinaryWriter::new();
    w.put_u8(ServerOpcode::Leaderboard as u8);
    w.put_u32(entries.len() as u32);
    for entry in entries {
        w.put_u32(entry.id);
        w.put_string_unicode(&entry.name);
    }
    w
}

/// Build a SpectateBounds packet (64).
pub fn build_spectate_bounds(bounds: WorldBounds) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(33);
    w.put_u8(ServerOpcode::SpectateBounds as u8);
    w.put_f64(bounds.min_x);
    w.put_f64(bounds.min_y);
    w.put_f64(bounds.max_x);
    w.put_f64(bounds.max_y);
    w
}
