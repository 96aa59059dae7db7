//! Destroy transitions: consumption by a predator, or disappearance.

use protocol::Position;

use super::entity::{Entity, EntityState};
use crate::interp::Snapshot;

/// Start the "absorbed" animation.
///
/// The prey travels from where it is drawn now to the predator's drawn
/// position at the moment of the event, keeping its own size. The target is
/// frozen; later predator motion does not affect it.
pub fn mark_consumed(prey: &mut Entity, predator_position: Position, now: f64) {
    let from = prey.rendered(now);
    prey.old = from;
    prey.new = Snapshot::new(predator_position, from.size);
    prey.update_time = now;
    prey.state = EntityState::Fading;
}

/// Start a plain fade in place, used when the server stops confirming a cell.
pub fn mark_vanished(entity: &mut Entity, now: f64) {
    let from = entity.rendered(now);
    entity.old = from;
    entity.new = from;
    entity.update_time = now;
    entity.state = EntityState::Fading;
}
