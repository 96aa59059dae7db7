//! Entity store: every known cell, live or fading, keyed by id.
//!
//! A world update is applied in three phases:
//! 1. consumption pairs, so prey animate from their pre-update position;
//! 2. cell records (create or rotate snapshots, adopt pending claims);
//! 3. liveness sweep of every live cell the pass did not mention.

mod consume;
mod entity;

pub use consume::{mark_consumed, mark_vanished};
pub use entity::{Entity, EntityState};

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use protocol::Position;
use protocol::packets::WorldUpdate;
use tracing::trace;

use crate::ownership::Ownership;

/// What a world update changed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WorldUpdateOutcome {
    /// Prey routed into the consumption animation.
    pub consumed: usize,
    /// Cells seen for the first time.
    pub created: usize,
    /// Cells faded by the liveness sweep.
    pub swept: usize,
    /// Set when the owned set went from empty to non-empty; the drawn
    /// position of the first adopted cell.
    pub first_owned: Option<Position>,
    /// At least one owned cell was destroyed and none are left.
    pub lost_all_owned: bool,
}

/// All cells the client currently knows about.
#[derive(Debug, Default)]
pub struct EntityStore {
    entities: HashMap<u32, Entity>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one decoded world update.
    ///
    /// `tag` must be unique per pass; it marks every cell the pass mentions.
    ///
    /// Cells are only created from records. A manifest id with no record and
    /// no known cell has no position or size to build from and is skipped, so
    /// such an id is still absent after the pass.
    pub fn apply_world_update(
        &mut self,
        update: &WorldUpdate,
        now: f64,
        tag: u64,
        ownership: &mut Ownership,
    ) -> WorldUpdateOutcome {
        let mut outcome = WorldUpdateOutcome::default();
        let mut lost_owned = false;

        // --- Consumption pairs ---
        for eat in &update.eats {
            let Some(predator_position) = self
                .entities
                .get(&eat.eater_id)
                .filter(|e| e.is_live())
                .map(|e| e.rendered(now).position)
            else {
                trace!("Eat record with unknown eater {}", eat.eater_id);
                continue;
            };
            match self.entities.get_mut(&eat.eaten_id) {
                Some(prey) if prey.is_live() => {
                    mark_consumed(prey, predator_position, now);
                    lost_owned |= ownership.remove(eat.eaten_id);
                    outcome.consumed += 1;
                }
                _ => trace!("Eat record with unknown prey {}", eat.eaten_id),
            }
        }

        // --- Cell records ---
        for record in &update.cells {
            match self.entities.entry(record.id) {
                Entry::Occupied(mut slot) if slot.get().is_live() => {
                    slot.get_mut().apply_record(record, now, tag);
                }
                Entry::Occupied(mut slot) => {
                    // A fading cell whose id the server reused.
                    slot.insert(Entity::from_record(record, now, tag));
                    outcome.created += 1;
                }
                Entry::Vacant(slot) => {
                    slot.insert(Entity::from_record(record, now, tag));
                    outcome.created += 1;
                }
            }

            let was_empty = ownership.is_empty();
            if ownership.adopt(record.id) && was_empty {
                outcome.first_owned = self.entities.get(&record.id).map(|e| e.rendered(now).position);
            }
        }

        // --- Liveness manifest ---
        for id in &update.alive {
            if let Some(entity) = self.entities.get_mut(id).filter(|e| e.is_live()) {
                entity.update_tag = tag;
            }
        }

        // --- Sweep ---
        for entity in self.entities.values_mut() {
            if entity.is_live() && entity.update_tag != tag {
                mark_vanished(entity, now);
                lost_owned |= ownership.remove(entity.id);
                outcome.swept += 1;
            }
        }

        outcome.lost_all_owned = lost_owned && ownership.is_empty();
        outcome
    }

    /// Drop fading cells whose animation has completed.
    pub fn purge_faded(&mut self, now: f64) -> usize {
        let before = self.entities.len();
        self.entities.retain(|_, e| !e.is_faded(now));
        before - self.entities.len()
    }

    #[inline]
    pub fn get(&self, id: u32) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Live cell by id.
    #[inline]
    pub fn live_entity(&self, id: u32) -> Option<&Entity> {
        self.entities.get(&id).filter(|e| e.is_live())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn fading(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(|e| e.is_fading())
    }

    #[inline]
    pub fn is_live(&self, id: u32) -> bool {
        self.live_entity(id).is_some()
    }

    #[inline]
    pub fn is_fading(&self, id: u32) -> bool {
        self.entities.get(&id).is_some_and(|e| e.is_fading())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }
}
