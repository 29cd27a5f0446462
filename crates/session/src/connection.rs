//! Websocket session loop
//!
//! Drives one connection from the socket opening until shutdown:
//! - answers `RoomInfo` with `Connect`, prompting for a password or slot name
//!   on the console when needed
//! - feeds every server packet to the `SessionContext`
//! - runs console commands between packets

use std::collections::VecDeque;

use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use uuid::Uuid;

use reporter::ShutdownListener;

use crate::commands::{process_line, ConsoleOutcome};
use crate::context::SessionContext;
use crate::error::SessionError;
use crate::protocol::{decode_frame, encode_frame, ClientPacket, ServerPacket};
use crate::Result;

/// Client side websocket stream
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Slot name and room password, either of which may be asked for later
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// URLs to try for an address, in order
///
/// An address with an explicit scheme is used as is. Otherwise secure
/// websockets are tried first, then plain.
pub fn candidate_urls(address: &str) -> Vec<String> {
    if address.contains("://") {
        vec![address.to_string()]
    } else {
        vec![format!("wss://{}", address), format!("ws://{}", address)]
    }
}

/// Open a websocket to the server at `address`
pub async fn connect(address: &str) -> Result<WsStream> {
    let mut reason = String::new();

    for url in candidate_urls(address) {
        debug!(%url, "Connecting");
        match connect_async(url.as_str()).await {
            Ok((stream, _response)) => {
                info!(%url, "Connected to server");
                return Ok(stream);
            }
            Err(e) => {
                debug!(%url, error = %e, "Connection attempt failed");
                reason = e.to_string();
            }
        }
    }

    Err(SessionError::Unreachable {
        address: address.to_string(),
        reason,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthState {
    AwaitingRoomInfo,
    AwaitingPassword,
    AwaitingName,
    Connecting,
    Connected,
}

enum Flow {
    Continue,
    Exit,
}

/// One connection to the server
pub struct Session<S> {
    ws: S,
    ctx: SessionContext,
    credentials: Credentials,
    uuid: String,
    state: AuthState,
    /// Answers typed before the server asked for them
    typeahead: VecDeque<String>,
    console_open: bool,
}

impl<S> Session<S>
where
    S: Stream<Item = std::result::Result<Message, tungstenite::Error>>
        + Sink<Message, Error = tungstenite::Error>
        + Unpin,
{
    pub fn new(ws: S, ctx: SessionContext, credentials: Credentials) -> Self {
        Self {
            ws,
            ctx,
            credentials,
            uuid: Uuid::new_v4().to_string(),
            state: AuthState::AwaitingRoomInfo,
            typeahead: VecDeque::new(),
            console_open: true,
        }
    }

    /// Process packets and console lines until shutdown, `/exit`, or disconnect
    ///
    /// Returns the final session state on a requested stop. A server side
    /// disconnect is reported as `SessionError::Closed`.
    pub async fn run(
        mut self,
        mut console: mpsc::Receiver<String>,
        mut shutdown: ShutdownListener,
    ) -> Result<SessionContext> {
        let outcome = loop {
            tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    debug!("Session received shutdown");
                    break Ok(());
                }
                line = console.recv(), if self.console_open => match line {
                    Some(line) => match self.handle_console(&line).await {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::Exit) => break Ok(()),
                        Err(e) => break Err(e),
                    },
                    None => {
                        self.console_open = false;
                        if let Some(what) = self.unanswered_prompt() {
                            break Err(SessionError::PromptUnanswered { what });
                        }
                    }
                },
                frame = self.ws.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = self.handle_text(&text).await {
                            break Err(e);
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break Err(SessionError::Closed),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(e.into()),
                },
            }
        };

        if !matches!(outcome, Err(SessionError::Closed)) {
            if let Err(e) = self.ws.close().await {
                debug!(error = %e, "Error while closing websocket");
            }
        }

        outcome.map(|()| self.ctx)
    }

    async fn handle_text(&mut self, text: &str) -> Result<()> {
        let packets = match decode_frame(text) {
            Ok(packets) => packets,
            Err(e) => {
                warn!(error = %e, "Ignoring invalid frame");
                return Ok(());
            }
        };

        for packet in packets {
            self.ctx.on_package(&packet);

            match packet {
                ServerPacket::RoomInfo {
                    password, seed_name, ..
                } => {
                    info!(seed = seed_name.as_deref().unwrap_or(""), "Received room info");
                    if self.state == AuthState::AwaitingRoomInfo {
                        self.begin_auth(password).await?;
                    }
                }
                ServerPacket::Connected { slot, .. } => {
                    self.state = AuthState::Connected;
                    info!(slot, "Connected, listening for death links");
                }
                ServerPacket::ConnectionRefused { errors } => {
                    return Err(SessionError::Refused { errors });
                }
                _ => {}
            }
        }

        Ok(())
    }

    async fn handle_console(&mut self, line: &str) -> Result<Flow> {
        let answer = line.trim();

        if !answer.starts_with('/') {
            match self.state {
                AuthState::AwaitingPassword => {
                    self.credentials.password = Some(answer.to_string());
                    self.request_name_or_connect().await?;
                    return Ok(Flow::Continue);
                }
                AuthState::AwaitingName => {
                    if answer.is_empty() {
                        info!("Enter slot name:");
                    } else {
                        self.credentials.name = Some(answer.to_string());
                        self.send_connect().await?;
                    }
                    return Ok(Flow::Continue);
                }
                AuthState::AwaitingRoomInfo if !answer.is_empty() => {
                    self.typeahead.push_back(answer.to_string());
                    return Ok(Flow::Continue);
                }
                _ => {}
            }
        }

        match process_line(line, &self.ctx) {
            ConsoleOutcome::Output(lines) => {
                for line in lines {
                    info!("{}", line);
                }
                Ok(Flow::Continue)
            }
            ConsoleOutcome::Exit => Ok(Flow::Exit),
        }
    }

    /// The console prompt still waiting for an answer, if any
    fn unanswered_prompt(&self) -> Option<&'static str> {
        match self.state {
            AuthState::AwaitingPassword => Some("password"),
            AuthState::AwaitingName => Some("slot name"),
            _ => None,
        }
    }

    async fn begin_auth(&mut self, password_required: bool) -> Result<()> {
        if password_required && is_blank(&self.credentials.password) {
            if let Some(answer) = self.typeahead.pop_front() {
                self.credentials.password = Some(answer);
                return self.request_name_or_connect().await;
            }
            if !self.console_open {
                return Err(SessionError::PromptUnanswered { what: "password" });
            }
            self.state = AuthState::AwaitingPassword;
            info!("Enter the password required to join this game:");
            return Ok(());
        }
        self.request_name_or_connect().await
    }

    async fn request_name_or_connect(&mut self) -> Result<()> {
        if is_blank(&self.credentials.name) {
            if let Some(answer) = self.typeahead.pop_front() {
                self.credentials.name = Some(answer);
                return self.send_connect().await;
            }
            if !self.console_open {
                return Err(SessionError::PromptUnanswered { what: "slot name" });
            }
            self.state = AuthState::AwaitingName;
            info!("Enter slot name:");
            return Ok(());
        }
        self.send_connect().await
    }

    async fn send_connect(&mut self) -> Result<()> {
        let Some(name) = self.credentials.name.as_deref() else {
            return Ok(());
        };
        let packet = ClientPacket::connect(name, self.credentials.password.as_deref(), &self.uuid);
        debug!(slot = name, "Sending connect");

        self.send(&[packet]).await?;
        self.state = AuthState::Connecting;
        Ok(())
    }

    async fn send(&mut self, packets: &[ClientPacket]) -> Result<()> {
        let frame = encode_frame(packets)?;
        self.ws.send(Message::Text(frame)).await?;
        Ok(())
    }
}

/// An empty answer counts as no answer
fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}
