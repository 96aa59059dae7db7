// Headless arena client: keeps a smoothly animated local copy of the world
// the server streams, and turns player input into outbound packets.

// Module structure - each module handles a specific concern
pub mod camera;    // Viewport, zoom, smooth follow
pub mod config;    // client.toml loading
pub mod error;     // Client error type
pub mod game;      // Session: world state tied to one connection
pub mod input;     // Pointer tracking, intent throttling
pub mod interp;    // Snapshot interpolation clock
pub mod network;   // WebSocket connection, reconnect loop
pub mod ownership; // Cells the local player controls
pub mod render;    // Renderer seam and frame model
pub mod ui;        // UI command channel
pub mod utils;     // Helper functions, LERP, monotonic clock
pub mod world;     // Entity store and destroy transitions

pub use config::ClientConfig;
pub use error::ClientError;
pub use game::Session;
pub use network::Client;
pub use render::{DrawCell, Frame, LeaderboardRow, Notice, Renderer};
pub use ui::{ClientCommand, ClientHandle, channel};
