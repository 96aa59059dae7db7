// UI entry points - commands the player's front end sends into the client task
use tokio::sync::mpsc;

use crate::error::ClientError;

/// Requests from the UI, handled in order by the client task.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// Set the nickname and join the arena.
    SetOwnerName(String),
    /// Switch to another server url; resets the session.
    SetRegion(String),
    Spectate,
    Split,
    Eject,
    SecondaryStart,
    SecondaryStop,
    /// Focus lost: release everything that is held.
    ReleaseAll,
    /// Pointer moved, screen coordinates.
    MouseMove { x: f64, y: f64 },
    /// Viewport resized, pixels.
    Resize { width: f64, height: f64 },
    Shutdown,
}

/// Cloneable handle to a running client.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    tx: mpsc::UnboundedSender<ClientCommand>,
}

/// Command channel between the UI and the client task.
pub fn channel() -> (ClientHandle, mpsc::UnboundedReceiver<ClientCommand>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ClientHandle { tx }, rx)
}

impl ClientHandle {
    pub fn send(&self, command: ClientCommand) -> Result<(), ClientError> {
        self.tx.send(command).map_err(|_| ClientError::Closed)
    }

    pub fn set_owner_name(&self, name: impl Into<String>) -> Result<(), ClientError> {
        self.send(ClientCommand::SetOwnerName(name.into()))
    }

    pub fn set_region(&self, url: impl Into<String>) -> Result<(), ClientError> {
        self.send(ClientCommand::SetRegion(url.into()))
    }

    pub fn spectate(&self) -> Result<(), ClientError> {
        self.send(ClientCommand::Spectate)
    }

    pub fn split(&self) -> Result<(), ClientError> {
        self.send(ClientCommand::Split)
    }

    pub fn eject(&self) -> Result<(), ClientError> {
        self.send(ClientCommand::Eject)
    }

    pub fn secondary_start(&self) -> Result<(), ClientError> {
        self.send(ClientCommand::SecondaryStart)
    }

    pub fn secondary_stop(&self) -> Result<(), ClientError> {
        self.send(ClientCommand::SecondaryStop)
    }

    pub fn release_all(&self) -> Result<(), ClientError> {
        self.send(ClientCommand::ReleaseAll)
    }

    pub fn mouse_move(&self, x: f64, y: f64) -> Result<(), ClientError> {
        self.send(ClientCommand::MouseMove { x, y })
    }

    pub fn resize(&self, width: f64, height: f64) -> Result<(), ClientError> {
        self.send(ClientCommand::Resize { width, height })
    }

    pub fn shutdown(&self) -> Result<(), ClientError> {
        self.send(ClientCommand::Shutdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_arrive_in_order() {
        let (handle, mut rx) = channel();
        handle.mouse_move(10.0, 20.0).unwrap();
        handle.split().unwrap();
        assert_eq!(rx.try_recv().unwrap(), ClientCommand::MouseMove { x: 10.0, y: 20.0 });
        assert_eq!(rx.try_recv().unwrap(), ClientCommand::Split);
    }

    #[test]
    fn test_closed_channel_reports_error() {
        let (handle, rx) = channel();
        drop(rx);
        assert!(matches!(handle.eject(), Err(ClientError::Closed)));
    }
}
