//! A single cell as seen by the client.

use protocol::packets::CellRecord;
use protocol::Color;

use crate::interp::{self, Snapshot};

/// Lifecycle of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    /// Confirmed by the server, part of gameplay.
    Live,
    /// Destroyed; kept only until its fade animation completes.
    Fading,
}

/// One cell: descriptive data plus a double-buffered snapshot pair.
///
/// The drawn state is `old -> new` interpolated with the eased fraction of
/// `now - update_time`.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: u32,
    pub color: Color,
    pub is_virus: bool,
    pub name: String,
    /// Lerp start (`ox, oy, oSize`).
    pub old: Snapshot,
    /// Lerp end (`nx, ny, nSize`).
    pub new: Snapshot,
    /// Timestamp (ms) at which `new` was set.
    pub update_time: f64,
    /// Decode pass that last mentioned this cell.
    pub update_tag: u64,
    pub state: EntityState,
}

impl Entity {
    /// First sighting: no motion, `old == new`.
    pub fn from_record(record: &CellRecord, now: f64, tag: u64) -> Self {
        let snapshot = Snapshot::new(record.position, record.size);
        Self {
            id: record.id,
            color: record.color,
            is_virus: record.is_virus(),
            name: record.name.clone(),
            old: snapshot,
            new: snapshot,
            update_time: now,
            update_tag: tag,
            state: EntityState::Live,
        }
    }

    /// Rotate the snapshot pair for a fresh server record.
    ///
    /// The new lerp start is where the cell is drawn right now, so an update
    /// arriving mid-window continues from the visible position.
    pub fn apply_record(&mut self, record: &CellRecord, now: f64, tag: u64) {
        self.old = self.rendered(now);
        self.new = Snapshot::new(record.position, record.size);
        self.update_time = now;
        self.update_tag = tag;

        self.color = record.color;
        self.is_virus = record.is_virus();
        if !record.name.is_empty() && record.name != self.name {
            self.name = record.name.clone();
        }
    }

    /// Eased interpolation fraction at `now`.
    #[inline]
    pub fn fraction(&self, now: f64) -> f64 {
        interp::fraction(now, self.update_time)
    }

    /// Drawn position and size at `now`.
    #[inline]
    pub fn rendered(&self, now: f64) -> Snapshot {
        interp::resolve(self.old, self.new, self.update_time, now)
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.state == EntityState::Live
    }

    #[inline]
    pub fn is_fading(&self) -> bool {
        self.state == EntityState::Fading
    }

    /// Renderer opacity: 1 while live, `1 - f'` while fading.
    #[inline]
    pub fn opacity(&self, now: f64) -> f64 {
        match self.state {
            EntityState::Live => 1.0,
            EntityState::Fading => 1.0 - self.fraction(now),
        }
    }

    /// True once a fading cell has finished its animation.
    #[inline]
    pub fn is_faded(&self, now: f64) -> bool {
        self.is_fading() && self.fraction(now) >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::Position;

    fn record(id: u32, x: f64, y: f64, size: f64, name: &str) -> CellRecord {
        CellRecord {
            id,
            position: Position::new(x, y),
            size,
            color: Color::new(1, 2, 3),
            flags: 0,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_first_sighting_does_not_move() {
        let e = Entity::from_record(&record(5, 3.0, 4.0, 10.0, "a"), 0.0, 1);
        assert_eq!(e.rendered(0.0), e.rendered(500.0));
        assert_eq!(e.rendered(60.0).position, Position::new(3.0, 4.0));
    }

    #[test]
    fn test_update_mid_window_continues_from_drawn_position() {
        let mut e = Entity::from_record(&record(5, 0.0, 0.0, 10.0, "a"), 0.0, 1);
        e.apply_record(&record(5, 100.0, 0.0, 10.0, ""), 1000.0, 2);
        // Halfway through the window the cell is drawn at x=50.
        e.apply_record(&record(5, 200.0, 0.0, 10.0, ""), 1060.0, 3);
        assert!((e.old.position.x - 50.0).abs() < 1e-9);
        assert_eq!(e.rendered(1060.0).position.x, e.old.position.x);
        assert_eq!(e.rendered(1180.0).position.x, 200.0);
    }

    #[test]
    fn test_name_refresh_ignores_empty() {
        let mut e = Entity::from_record(&record(5, 0.0, 0.0, 10.0, "first"), 0.0, 1);
        e.apply_record(&record(5, 0.0, 0.0, 10.0, ""), 10.0, 2);
        assert_eq!(e.name, "first");
        e.apply_record(&record(5, 0.0, 0.0, 10.0, "second"), 20.0, 3);
        assert_eq!(e.name, "second");
    }

    #[test]
    fn test_fresh_entity_is_opaque() {
        let e = Entity::from_record(&record(1, 0.0, 0.0, 20.0, ""), 0.0, 1);
        assert_eq!(e.rendered(0.0).size, 20.0);
        assert_eq!(e.opacity(0.0), 1.0);
    }
}
