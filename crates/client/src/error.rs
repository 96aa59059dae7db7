use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("gave up after {0} reconnect attempts")]
    ReconnectLimit(u32),
    #[error("client task has stopped")]
    Closed,
}
