// Camera system - viewport, zoom, smooth follow
//
// Smoothing is per frame:
//   alive:      position = (position + average) / 2
//               zoom     = (9 * zoom + sample) / 10
//   spectating: position = (29 * position + target) / 30
//               zoom     = (9 * zoom + desired) / 10
//
// Zoom sample: min(64 / sqrt(total mass), 1) ^ 0.4 * max(h / 1080, w / 1920),
// where total mass is the sum of squared sizes of the owned cells.
use protocol::Position;
use protocol::packets::WorldBounds;

/// Viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Resolution factor relative to a 1920x1080 reference screen.
    #[inline]
    pub fn scale_factor(&self) -> f64 {
        (self.height / 1080.0).max(self.width / 1920.0)
    }

    #[inline]
    pub fn center(&self) -> Position {
        Position::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Read-only camera view handed to the UI and renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// Smoothed view center (`s, t`).
    pub center: Position,
    /// Smoothed zoom.
    pub zoom: f64,
    /// Zoom the camera is drifting towards.
    pub desired_zoom: f64,
}

pub struct Camera {
    pub position: Position,
    pub target_position: Position,
    pub zoom: f64,
    pub desired_zoom: f64,
    bounds: WorldBounds,
    viewport: Viewport,
    margin: f64,
}

impl Camera {
    pub fn new(viewport: Viewport, margin: f64) -> Self {
        let bounds = WorldBounds::default();
        let center = bounds.center();
        Self {
            position: center,
            target_position: center,
            zoom: 1.0,
            desired_zoom: 1.0,
            bounds,
            viewport,
            margin,
        }
    }

    /// Zoom sample for a given total mass (sum of squared sizes).
    pub fn zoom_for_mass(&self, total_mass: f64) -> f64 {
        let radius = total_mass.max(f64::MIN_POSITIVE).sqrt();
        (64.0 / radius).min(1.0).powf(0.4) * self.viewport.scale_factor()
    }

    /// Follow the owned cells' drawn positions and sizes. Call once per frame.
    pub fn follow_cells(&mut self, cell_positions: &[Position], cell_sizes: &[f64]) {
        if cell_positions.is_empty() {
            return;
        }

        let total_mass: f64 = cell_sizes.iter().map(|s| s * s).sum();
        let sample = self.zoom_for_mass(total_mass);
        self.zoom = (9.0 * self.zoom + sample) / 10.0;
        self.desired_zoom = self.zoom;

        let sum: Position = cell_positions.iter().copied().sum();
        self.target_position = sum / cell_positions.len() as f64;
        self.position = (self.position + self.target_position) / 2.0;
    }

    /// Drift towards the spectate target. Call once per frame while no
    /// cell is owned.
    pub fn drift(&mut self) {
        self.target_position = self.clamp_to_bounds(self.target_position);
        self.position = (self.position * 29.0 + self.target_position) / 30.0;
        self.zoom = (9.0 * self.zoom + self.desired_zoom) / 10.0;
    }

    /// Keep the view from showing more than `margin` pixels outside the world.
    fn clamp_to_bounds(&self, target: Position) -> Position {
        let zoom = self.zoom.max(f64::MIN_POSITIVE);
        let half_w = (self.viewport.width / 2.0 - self.margin) / zoom;
        let half_h = (self.viewport.height / 2.0 - self.margin) / zoom;
        let center = self.bounds.center();
        Position::new(
            clamp_axis(target.x, self.bounds.min_x + half_w, self.bounds.max_x - half_w, center.x),
            clamp_axis(target.y, self.bounds.min_y + half_h, self.bounds.max_y - half_h, center.y),
        )
    }

    /// New spectate box: the target becomes its midpoint. When spectating the
    /// camera jumps there at zoom 1.
    pub fn set_spectate_bounds(&mut self, bounds: WorldBounds, spectating: bool) {
        self.bounds = bounds;
        self.target_position = bounds.center();
        self.desired_zoom = 1.0;
        if spectating {
            self.position = self.target_position;
            self.zoom = self.desired_zoom;
        }
    }

    /// Server hint for where to look while not owning a cell.
    pub fn set_position_hint(&mut self, x: f64, y: f64) {
        self.target_position = Position::new(x, y);
    }

    /// Jump straight to a position (first owned cell).
    pub fn snap_to(&mut self, position: Position) {
        self.position = position;
        self.target_position = position;
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// Convert screen coordinates to world coordinates.
    #[inline]
    pub fn screen_to_world(&self, screen_pos: Position) -> Position {
        (screen_pos - self.viewport.center()) / self.zoom + self.position
    }

    pub fn state(&self) -> CameraState {
        CameraState {
            center: self.position,
            zoom: self.zoom,
            desired_zoom: self.desired_zoom,
        }
    }
}

/// Clamp into `[lo, hi]`; when the view is wider than the world, centre it.
#[inline]
fn clamp_axis(value: f64, lo: f64, hi: f64, center: f64) -> f64 {
    if lo > hi { center } else { value.clamp(lo, hi) }
}
