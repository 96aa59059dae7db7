// Pointer tracking and movement intent throttling
use protocol::Position;

/// When a movement intent may go out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntentPolicy {
    /// Never send two intents closer together than this.
    pub min_interval_ms: f64,
    /// Resend the current intent at least this often.
    pub resend_ms: f64,
    /// Pointer movement (screen pixels) that warrants a send before the
    /// resend cadence is due.
    pub min_distance: f64,
}

impl Default for IntentPolicy {
    fn default() -> Self {
        Self {
            min_interval_ms: 40.0,
            resend_ms: 100.0,
            min_distance: 8.0,
        }
    }
}

pub struct Input {
    /// Pointer in screen space.
    pub mouse_pos: Position,
    /// Secondary action currently held.
    pub secondary_held: bool,
    policy: IntentPolicy,
    last_sent_at: Option<f64>,
    last_sent_pos: Position,
}

impl Input {
    pub fn new(policy: IntentPolicy) -> Self {
        Self {
            mouse_pos: Position::ZERO,
            secondary_held: false,
            policy,
            last_sent_at: None,
            last_sent_pos: Position::ZERO,
        }
    }

    pub fn set_mouse(&mut self, screen: Position) {
        self.mouse_pos = screen;
    }

    /// Whether an intent should be sent now. Records the send when it
    /// returns `true`.
    pub fn poll_intent(&mut self, now: f64) -> bool {
        let due = match self.last_sent_at {
            None => true,
            Some(last) => {
                let elapsed = now - last;
                if elapsed < self.policy.min_interval_ms {
                    false
                } else {
                    elapsed >= self.policy.resend_ms
                        || self.mouse_pos.distance(self.last_sent_pos) >= self.policy.min_distance
                }
            }
        };
        if due {
            self.mark_sent(now);
        }
        due
    }

    /// Record an intent sent outside the throttle (ahead of split/eject).
    pub fn mark_sent(&mut self, now: f64) {
        self.last_sent_at = Some(now);
        self.last_sent_pos = self.mouse_pos;
    }

    /// Edge detection for the secondary action. Returns `true` on a change.
    pub fn set_secondary(&mut self, held: bool) -> bool {
        let changed = self.secondary_held != held;
        self.secondary_held = held;
        changed
    }

    /// Forget throttle state and held actions (new connection).
    pub fn reset(&mut self) {
        self.secondary_held = false;
        self.last_sent_at = None;
    }
}
