// Ownership: cells controlled by the local player
//
// The server first announces an id (claim), then the cell data arrives in a
// world update; the claim is consumed the first time that record appears.

/// Owned ids, pending claims, and the running score of this life.
#[derive(Debug, Default, Clone)]
pub struct Ownership {
    owned: Vec<u32>,
    pending: Vec<u32>,
    score: f64,
}

impl Ownership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a claim ticket for `id`.
    pub fn claim(&mut self, id: u32) {
        if !self.pending.contains(&id) && !self.owned.contains(&id) {
            self.pending.push(id);
        }
    }

    /// Consume a pending claim for `id` and move it into the owned set.
    /// Returns true if the cell became owned.
    pub fn adopt(&mut self, id: u32) -> bool {
        let Some(index) = self.pending.iter().position(|&p| p == id) else {
            return false;
        };
        self.pending.remove(index);
        if self.owned.contains(&id) {
            return false;
        }
        self.owned.push(id);
        true
    }

    /// Drop `id` from owned and pending. Returns true if it was owned.
    pub fn remove(&mut self, id: u32) -> bool {
        self.pending.retain(|&p| p != id);
        let before = self.owned.len();
        self.owned.retain(|&o| o != id);
        self.owned.len() != before
    }

    /// Lost everything (death). Also ends the current life's score.
    pub fn clear(&mut self) {
        self.owned.clear();
        self.pending.clear();
        self.score = 0.0;
    }

    #[inline]
    pub fn owned(&self) -> &[u32] {
        &self.owned
    }

    #[inline]
    pub fn pending(&self) -> &[u32] {
        &self.pending
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        self.owned.contains(&id)
    }

    /// Owned or announced as about to be owned.
    #[inline]
    pub fn is_claimed(&self, id: u32) -> bool {
        self.owned.contains(&id) || self.pending.contains(&id)
    }

    /// Feed the total mass (sum of squared target sizes) seen this frame.
    /// The score never decreases until [`Ownership::clear`] or [`Ownership::reset_score`].
    pub fn observe_mass(&mut self, total: f64) {
        if total > self.score {
            self.score = total;
        }
    }

    #[inline]
    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn reset_score(&mut self) {
        self.score = 0.0;
    }
}
