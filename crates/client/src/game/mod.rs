// Game session - world state, ownership, camera and input for one connection
use bytes::Bytes;
use protocol::packets::{ClientPacket, LeaderboardEntry, ServerPacket};
use protocol::{Position, ProtocolError};
use tracing::{debug, info};

use crate::camera::{Camera, Viewport};
use crate::config::ClientConfig;
use crate::input::Input;
use crate::ownership::Ownership;
use crate::render::{self, DrawCell, Frame, LeaderboardRow, Notice};
use crate::ui::ClientCommand;
use crate::world::EntityStore;

/// Client-side state for one server connection.
///
/// Everything here is driven by the transport loop: inbound frames through
/// [`Session::handle_frame`], UI requests through [`Session::command`], and
/// the render tick through [`Session::tick`] + [`Session::frame`].
pub struct Session {
    store: EntityStore,
    ownership: Ownership,
    leaderboard: Vec<LeaderboardEntry>,
    camera: Camera,
    input: Input,
    nickname: Option<String>,
    protocol_version: u32,
    margin: f64,
    /// Update tag handed to the next world update pass.
    next_tag: u64,
}

impl Session {
    pub fn new(config: &ClientConfig) -> Self {
        let viewport = Viewport::new(config.view.width, config.view.height);
        Self {
            store: EntityStore::new(),
            ownership: Ownership::new(),
            leaderboard: Vec::new(),
            camera: Camera::new(viewport, config.view.border_margin),
            input: Input::new(config.input.policy()),
            nickname: config.player.nickname.clone(),
            protocol_version: config.connection.protocol_version,
            margin: config.view.border_margin,
            next_tag: 1,
        }
    }

    /// Drop all server-derived state. Nickname and viewport survive.
    pub fn reset(&mut self) {
        self.store.clear();
        self.ownership.clear();
        self.leaderboard.clear();
        self.camera = Camera::new(self.camera.viewport(), self.margin);
        self.input.reset();
    }

    /// Messages to send as soon as the socket opens.
    pub fn on_open(&self) -> Vec<ClientPacket> {
        let mut packets = vec![ClientPacket::Handshake { version: self.protocol_version }];
        packets.extend(self.join_packet());
        packets
    }

    pub fn join_packet(&self) -> Option<ClientPacket> {
        self.nickname.as_ref().map(|name| ClientPacket::Join { name: name.clone() })
    }

    /// Decode and apply one binary frame. A malformed frame changes nothing.
    pub fn handle_frame(&mut self, data: impl Into<Bytes>, now: f64) -> Result<Option<Notice>, ProtocolError> {
        let packet = ServerPacket::parse_bytes(data.into())?;
        Ok(self.apply(packet, now))
    }

    pub fn apply(&mut self, packet: ServerPacket, now: f64) -> Option<Notice> {
        match packet {
            ServerPacket::WorldUpdate(update) => {
                let tag = self.next_tag;
                self.next_tag = self.next_tag.wrapping_add(1);
                let outcome = self.store.apply_world_update(&update, now, tag, &mut self.ownership);
                debug!(
                    "World update: {} consumed, {} created, {} swept",
                    outcome.consumed, outcome.created, outcome.swept
                );
                if outcome.lost_all_owned {
                    info!("All owned cells lost");
                    return Some(Notice::Died);
                }
                if let Some(position) = outcome.first_owned {
                    self.camera.snap_to(position);
                    return Some(Notice::Spawned);
                }
                None
            }
            ServerPacket::SelfPosition { x, y, .. } => {
                self.camera.set_position_hint(x, y);
                None
            }
            ServerPacket::ClearOwned => {
                self.ownership.clear();
                None
            }
            ServerPacket::AddOwned(id) => {
                self.ownership.claim(id);
                None
            }
            ServerPacket::Leaderboard(entries) => {
                self.leaderboard = entries;
                None
            }
            ServerPacket::SpectateBounds(bounds) => {
                self.camera.set_spectate_bounds(bounds, self.ownership.is_empty());
                None
            }
        }
    }

    /// Per-frame bookkeeping: purge finished fades, move the camera and
    /// track the score.
    pub fn tick(&mut self, now: f64) {
        self.store.purge_faded(now);

        let mut positions = Vec::with_capacity(self.ownership.owned().len());
        let mut sizes = Vec::with_capacity(self.ownership.owned().len());
        let mut target_mass = 0.0;
        for entity in self.ownership.owned().iter().filter_map(|&id| self.store.live_entity(id)) {
            let drawn = entity.rendered(now);
            positions.push(drawn.position);
            sizes.push(drawn.size);
            target_mass += entity.new.size * entity.new.size;
        }

        if positions.is_empty() {
            self.camera.drift();
        } else {
            self.camera.follow_cells(&positions, &sizes);
            self.ownership.observe_mass(target_mass);
        }
    }

    /// Snapshot of everything the renderer needs at `now`.
    pub fn frame(&self, now: f64) -> Frame<'_> {
        let mut cells: Vec<DrawCell<'_>> = self
            .store
            .iter()
            .map(|entity| {
                let drawn = entity.rendered(now);
                DrawCell {
                    id: entity.id,
                    position: drawn.position,
                    size: drawn.size,
                    opacity: entity.opacity(now),
                    color: entity.color,
                    name: &entity.name,
                    is_virus: entity.is_virus,
                    is_owned: self.ownership.contains(entity.id),
                    fading: entity.is_fading(),
                }
            })
            .collect();
        render::sort_for_drawing(&mut cells);

        let leaderboard = self
            .leaderboard
            .iter()
            .enumerate()
            .map(|(i, entry)| LeaderboardRow {
                rank: i + 1,
                name: &entry.name,
                is_self: self.ownership.is_claimed(entry.id),
            })
            .collect();

        Frame {
            cells,
            camera: self.camera.state(),
            score: self.ownership.score() / 100.0,
            leaderboard,
            owned_count: self.ownership.owned().len(),
        }
    }

    /// Handle a UI command; returns the packets it produces, in send order.
    pub fn command(&mut self, command: ClientCommand, now: f64) -> Vec<ClientPacket> {
        match command {
            ClientCommand::SetOwnerName(name) => {
                self.nickname = Some(name);
                self.ownership.reset_score();
                self.join_packet().into_iter().collect()
            }
            ClientCommand::Spectate => vec![ClientPacket::Spectate],
            ClientCommand::Split => vec![self.flush_intent(now), ClientPacket::Split],
            ClientCommand::Eject => vec![self.flush_intent(now), ClientPacket::Eject],
            ClientCommand::SecondaryStart => {
                if self.input.set_secondary(true) {
                    vec![ClientPacket::SecondaryStart]
                } else {
                    Vec::new()
                }
            }
            ClientCommand::SecondaryStop => {
                if self.input.set_secondary(false) {
                    vec![ClientPacket::SecondaryStop]
                } else {
                    Vec::new()
                }
            }
            ClientCommand::ReleaseAll => {
                self.input.set_secondary(false);
                vec![ClientPacket::SecondaryStop]
            }
            ClientCommand::MouseMove { x, y } => {
                self.input.set_mouse(Position::new(x, y));
                Vec::new()
            }
            ClientCommand::Resize { width, height } => {
                self.camera.resize(Viewport::new(width, height));
                Vec::new()
            }
            // Connection-level; the transport loop acts on these.
            ClientCommand::SetRegion(_) | ClientCommand::Shutdown => Vec::new(),
        }
    }

    /// Throttled movement intent, if one is due.
    pub fn poll_intent(&mut self, now: f64) -> Option<ClientPacket> {
        self.input.poll_intent(now).then(|| self.intent_packet())
    }

    fn flush_intent(&mut self, now: f64) -> ClientPacket {
        self.input.mark_sent(now);
        self.intent_packet()
    }

    fn intent_packet(&self) -> ClientPacket {
        let target = self.camera.screen_to_world(self.input.mouse_pos);
        ClientPacket::Target { x: target.x, y: target.y }
    }

    #[inline]
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    #[inline]
    pub fn ownership(&self) -> &Ownership {
        &self.ownership
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn leaderboard(&self) -> &[LeaderboardEntry] {
        &self.leaderboard
    }

    #[inline]
    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }
}
