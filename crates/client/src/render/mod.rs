// Renderer seam - the session hands a finished frame to whatever draws it
use protocol::{Color, Position};

use crate::camera::CameraState;

/// One cell as it should be drawn this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCell<'a> {
    pub id: u32,
    pub position: Position,
    pub size: f64,
    /// 1.0 while live, fades to 0.0 after destruction.
    pub opacity: f64,
    pub color: Color,
    pub name: &'a str,
    pub is_virus: bool,
    pub is_owned: bool,
    pub fading: bool,
}

impl DrawCell<'_> {
    #[inline]
    pub fn mass(&self) -> f64 {
        self.size * self.size / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow<'a> {
    pub rank: usize,
    pub name: &'a str,
    /// Entry belongs to the local player.
    pub is_self: bool,
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<'a> {
    /// Sorted by drawn size ascending, ties by id.
    pub cells: Vec<DrawCell<'a>>,
    pub camera: CameraState,
    /// Best total mass this life, already divided by 100.
    pub score: f64,
    pub leaderboard: Vec<LeaderboardRow<'a>>,
    pub owned_count: usize,
}

/// Out-of-band events worth surfacing to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// First owned cell appeared.
    Spawned,
    /// Last owned cell was destroyed.
    Died,
    /// Transport came up and the handshake went out.
    Connected,
    /// Transport dropped; the session has been reset.
    Disconnected,
}

pub trait Renderer {
    fn render(&mut self, frame: &Frame<'_>);

    fn on_notice(&mut self, _notice: Notice) {}
}

/// Sort cells into painter's order: small first, ties by id.
pub(crate) fn sort_for_drawing(cells: &mut [DrawCell<'_>]) {
    cells.sort_by(|a, b| a.size.total_cmp(&b.size).then(a.id.cmp(&b.id)));
}
