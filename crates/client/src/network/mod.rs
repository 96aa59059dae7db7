// WebSocket connection, reconnect policy and the client event loop
use futures_util::{SinkExt, StreamExt};
use futures_util::stream::SplitSink;
use protocol::packets::ClientPacket;
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{self, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::game::Session;
use crate::render::{Notice, Renderer};
use crate::ui::ClientCommand;
use crate::utils::Clock;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWrite = SplitSink<WsStream, Message>;

/// Why a connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConnectionEnd {
    /// Socket closed or failed; reconnect after the delay.
    Closed,
    /// Shutdown requested, or every handle was dropped.
    Shutdown,
    /// Region change; reconnect to the new url right away.
    Switch(String),
}

/// Prefix bare `host:port` addresses with `ws://`.
pub fn normalize_url(url: &str) -> String {
    if url.starts_with("ws://") || url.starts_with("wss://") {
        url.to_string()
    } else {
        format!("ws://{}", url)
    }
}

/// The client: one session, one renderer, one connection at a time.
pub struct Client<R> {
    config: ClientConfig,
    session: Session,
    renderer: R,
    clock: Clock,
    url: String,
}

impl<R: Renderer> Client<R> {
    pub fn new(config: ClientConfig, renderer: R) -> Self {
        let session = Session::new(&config);
        let url = normalize_url(&config.connection.url);
        Self {
            config,
            session,
            renderer,
            clock: Clock::new(),
            url,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Connect, process, reconnect, until shutdown or the attempt limit.
    pub async fn run(&mut self, mut commands: UnboundedReceiver<ClientCommand>) -> Result<(), ClientError> {
        let delay = self.config.connection.reconnect_delay();
        let max_attempts = self.config.connection.max_reconnect_attempts;
        let mut failures = 0u32;

        loop {
            info!("Connecting to {}", self.url);
            let end = match connect(&self.url).await {
                Ok(ws) => {
                    failures = 0;
                    let end = self.run_connection(ws, &mut commands).await;
                    self.session.reset();
                    self.renderer.on_notice(Notice::Disconnected);
                    end
                }
                Err(e) => {
                    failures += 1;
                    warn!("Connection to {} failed: {}", self.url, e);
                    if max_attempts.is_some_and(|max| failures >= max) {
                        return Err(ClientError::ReconnectLimit(failures));
                    }
                    ConnectionEnd::Closed
                }
            };

            match end {
                ConnectionEnd::Shutdown => {
                    info!("Client shut down");
                    return Ok(());
                }
                ConnectionEnd::Switch(url) => {
                    self.url = normalize_url(&url);
                }
                ConnectionEnd::Closed => {
                    info!("Reconnecting in {}ms", delay.as_millis());
                    match self.wait_reconnect(delay, &mut commands).await {
                        ConnectionEnd::Shutdown => return Ok(()),
                        ConnectionEnd::Switch(url) => self.url = normalize_url(&url),
                        ConnectionEnd::Closed => {}
                    }
                }
            }
        }
    }

    /// Process one open socket until it ends.
    async fn run_connection(
        &mut self,
        ws: WsStream,
        commands: &mut UnboundedReceiver<ClientCommand>,
    ) -> ConnectionEnd {
        let (mut write, mut read) = ws.split();
        info!("Connected to {}", self.url);

        for packet in self.session.on_open() {
            if let Err(e) = send(&mut write, &packet).await {
                warn!("Failed to send {:?}: {}", packet.opcode(), e);
                return ConnectionEnd::Closed;
            }
        }
        self.renderer.on_notice(Notice::Connected);

        let mut render_tick = time::interval(self.config.view.frame_interval());
        render_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut intent_tick = time::interval(self.config.input.tick_interval());
        intent_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Binary(data))) => {
                            match self.session.handle_frame(data, self.clock.now()) {
                                Ok(Some(notice)) => self.renderer.on_notice(notice),
                                Ok(None) => {}
                                Err(e) => warn!("Dropping malformed frame: {}", e),
                            }
                        }
                        Some(Ok(Message::Close(_))) => {
                            info!("Server closed the connection");
                            return ConnectionEnd::Closed;
                        }
                        Some(Err(e)) => {
                            warn!("WebSocket error: {}", e);
                            return ConnectionEnd::Closed;
                        }
                        None => return ConnectionEnd::Closed,
                        _ => {}
                    }
                }
                cmd = commands.recv() => {
                    match cmd {
                        None | Some(ClientCommand::Shutdown) => {
                            let _ = write.send(Message::Close(None)).await;
                            return ConnectionEnd::Shutdown;
                        }
                        Some(ClientCommand::SetRegion(url)) => {
                            if normalize_url(&url) != self.url {
                                info!("Switching region to {}", url);
                                let _ = write.send(Message::Close(None)).await;
                                return ConnectionEnd::Switch(url);
                            }
                        }
                        Some(command) => {
                            for packet in self.session.command(command, self.clock.now()) {
                                if let Err(e) = send(&mut write, &packet).await {
                                    warn!("Failed to send {:?}: {}", packet.opcode(), e);
                                    return ConnectionEnd::Closed;
                                }
                            }
                        }
                    }
                }
                _ = render_tick.tick() => {
                    let now = self.clock.now();
                    self.session.tick(now);
                    self.renderer.render(&self.session.frame(now));
                }
                _ = intent_tick.tick() => {
                    if let Some(packet) = self.session.poll_intent(self.clock.now()) {
                        if let Err(e) = send(&mut write, &packet).await {
                            warn!("Failed to send intent: {}", e);
                            return ConnectionEnd::Closed;
                        }
                    }
                }
            }
        }
    }

    /// Sleep out the reconnect delay while still honouring UI commands.
    async fn wait_reconnect(
        &mut self,
        delay: time::Duration,
        commands: &mut UnboundedReceiver<ClientCommand>,
    ) -> ConnectionEnd {
        let sleep = time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return ConnectionEnd::Closed,
                cmd = commands.recv() => {
                    match cmd {
                        None | Some(ClientCommand::Shutdown) => return ConnectionEnd::Shutdown,
                        Some(ClientCommand::SetRegion(url)) => return ConnectionEnd::Switch(url),
                        Some(command @ (ClientCommand::SetOwnerName(_)
                            | ClientCommand::MouseMove { .. }
                            | ClientCommand::Resize { .. })) => {
                            self.session.command(command, self.clock.now());
                        }
                        Some(command) => debug!("Ignoring {:?} while disconnected", command),
                    }
                }
            }
        }
    }
}

async fn connect(url: &str) -> Result<WsStream, ClientError> {
    let (ws, _response) = connect_async(url).await?;
    Ok(ws)
}

async fn send(write: &mut WsWrite, packet: &ClientPacket) -> Result<(), ClientError> {
    write.send(Message::Binary(packet.encode())).await?;
    Ok(())
}
