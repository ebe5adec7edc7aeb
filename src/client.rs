//! Asynchronous client driver.
//!
//! [`Client::run`] is a single task that owns the session, the history, the
//! framing codec, and the transport. Everything that mutates identity or
//! history flows through it: inbound protocol lines and front-end
//! [`Request`]s are funneled into one `select!` loop, so no mutation ever
//! races another. Front-ends hold a cloneable [`Handle`] and consume the
//! [`Event`] stream.

use std::time::Duration;

use bytes::BytesMut;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, info};

use slirc_wire::{LineCodec, Message};

use crate::config::Config;
use crate::error::ClientError;
use crate::events::{Event, Failure};
use crate::history::HistoryEntry;
use crate::input::Input;
use crate::session::{Action, Session};
use crate::state::Identity;
use crate::transport::Transport;

/// Requests a front-end can issue to the running client.
#[derive(Debug)]
pub enum Request {
    /// Join a channel (auto-`#`-prefixed when no sigil is given).
    Join(String),
    /// Leave the given channel, or the current one.
    Part(Option<String>),
    /// Send a message to a target, or to the current channel.
    Privmsg {
        /// Channel or nickname; `None` means the current channel.
        target: Option<String>,
        /// Message text.
        text: String,
    },
    /// Change nickname.
    Nick(String),
    /// Send a caller-assembled protocol line verbatim.
    Raw(String),
    /// Query message history.
    History {
        /// Target to query; `None` means the current channel.
        target: Option<String>,
        /// Maximum entries to return.
        count: usize,
        /// Where to deliver the result.
        reply: oneshot::Sender<Vec<HistoryEntry>>,
    },
    /// End the session with the given QUIT reason.
    Disconnect {
        /// QUIT reason sent to the server.
        reason: String,
    },
}

/// Cloneable front-end handle to a running [`Client`].
#[derive(Clone, Debug)]
pub struct Handle {
    tx: mpsc::UnboundedSender<Request>,
}

impl Handle {
    fn send(&self, req: Request) -> Result<(), ClientError> {
        self.tx.send(req).map_err(|_| ClientError::NotRunning)
    }

    /// Join a channel.
    pub fn join(&self, channel: impl Into<String>) -> Result<(), ClientError> {
        self.send(Request::Join(channel.into()))
    }

    /// Leave `channel`, or the current channel when `None`.
    pub fn part(&self, channel: Option<String>) -> Result<(), ClientError> {
        self.send(Request::Part(channel))
    }

    /// Send a message to `target`, or to the current channel when `None`.
    pub fn privmsg(
        &self,
        target: Option<String>,
        text: impl Into<String>,
    ) -> Result<(), ClientError> {
        self.send(Request::Privmsg {
            target,
            text: text.into(),
        })
    }

    /// Change nickname.
    pub fn nick(&self, nick: impl Into<String>) -> Result<(), ClientError> {
        self.send(Request::Nick(nick.into()))
    }

    /// Send a raw protocol line.
    pub fn raw(&self, line: impl Into<String>) -> Result<(), ClientError> {
        self.send(Request::Raw(line.into()))
    }

    /// End the session.
    pub fn disconnect(&self, reason: impl Into<String>) -> Result<(), ClientError> {
        self.send(Request::Disconnect {
            reason: reason.into(),
        })
    }

    /// Query message history for `target` (or the current channel).
    pub async fn history(
        &self,
        target: Option<String>,
        count: usize,
    ) -> Result<Vec<HistoryEntry>, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::History {
            target,
            count,
            reply,
        })?;
        rx.await.map_err(|_| ClientError::NotRunning)
    }

    /// Dispatch a parsed [`Input`] when it maps to a protocol action.
    ///
    /// Returns `Ok(false)` for presentation-only variants (`Help`, `Usage`,
    /// `Unknown`, `Empty`, the `/nick` query form, and `History`, which
    /// needs the async [`Handle::history`] call); the front-end renders
    /// those itself.
    pub fn dispatch(&self, input: &Input) -> Result<bool, ClientError> {
        match input {
            Input::Say(text) => self.privmsg(None, text.clone()).map(|_| true),
            Input::Join(channel) => self.join(channel.clone()).map(|_| true),
            Input::Part => self.part(None).map(|_| true),
            Input::Nick(Some(nick)) => self.nick(nick.clone()).map(|_| true),
            Input::Msg { target, text } => self
                .privmsg(Some(target.clone()), text.clone())
                .map(|_| true),
            Input::Quit => self.disconnect("Goodbye!").map(|_| true),
            _ => Ok(false),
        }
    }
}

/// The client driver. Create with [`Client::new`], then feed it a connected
/// transport via [`Client::run`]; run again with a fresh transport to
/// reconnect (history survives, identity is reset).
pub struct Client {
    session: Session,
    codec: LineCodec,
    requests: mpsc::UnboundedReceiver<Request>,
    events: mpsc::UnboundedSender<Event>,
    drain_timeout: Duration,
    server: String,
}

impl Client {
    /// Build a client from configuration. Returns the client itself, a
    /// request handle for front-ends, and the event stream they render.
    pub fn new(config: &Config) -> (Client, Handle, mpsc::UnboundedReceiver<Event>) {
        let identity = Identity::new(
            config.identity.nickname.clone(),
            config.identity.username.clone(),
            config.identity.realname.clone(),
        );
        let session = Session::new(
            identity,
            config.limits.history_limit,
            config.limits.max_nick_attempts,
        );
        let (req_tx, req_rx) = mpsc::unbounded_channel();
        let (ev_tx, ev_rx) = mpsc::unbounded_channel();

        let client = Client {
            session,
            codec: LineCodec::new(),
            requests: req_rx,
            events: ev_tx,
            drain_timeout: Duration::from_secs(config.limits.drain_timeout_secs),
            server: format!("{}:{}", config.server.host, config.server.port),
        };
        (client, Handle { tx: req_tx }, ev_rx)
    }

    /// The session state (identity, phase, history).
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Drive the session over a connected transport until it ends.
    ///
    /// Registration is sent immediately; the loop then serves inbound lines
    /// and front-end requests until the server closes the stream, a fatal
    /// protocol failure occurs, or a disconnect is requested. The shutdown
    /// sequence (PART, QUIT, bounded drain, close, identity reset) runs on
    /// every exit path; transport faults are returned to the caller after
    /// cleanup.
    pub async fn run<T: Transport>(&mut self, mut transport: T) -> Result<(), ClientError> {
        let mut buf = BytesMut::new();

        info!(server = %self.server, "connected, registering");
        self.emit(Event::Connected {
            server: self.server.clone(),
        });

        let start = self.session.start();
        let outcome = match self.perform(start, &mut transport).await {
            Ok(Some(reason)) => Ok(reason),
            Ok(None) => self.event_loop(&mut transport, &mut buf).await,
            Err(e) => Err(e),
        };

        let reason = match &outcome {
            Ok(reason) => reason.clone(),
            Err(e) => e.to_string(),
        };
        self.shutdown(&mut transport, &mut buf, &reason).await;

        outcome.map(|_| ())
    }

    /// Serve inbound lines and front-end requests until the session ends.
    /// Returns the termination reason.
    async fn event_loop<T: Transport>(
        &mut self,
        transport: &mut T,
        buf: &mut BytesMut,
    ) -> Result<String, ClientError> {
        loop {
            // Inbound traffic is served before queued requests so a PING is
            // never stuck behind outbound work.
            tokio::select! {
                biased;
                chunk = transport.recv() => match chunk? {
                    Some(bytes) => {
                        buf.extend_from_slice(&bytes);
                        if let Some(reason) = self.process_buffer(transport, buf).await? {
                            return Ok(reason);
                        }
                    }
                    None => {
                        info!("server closed the connection");
                        return Ok("connection closed by server".to_owned());
                    }
                },
                req = self.requests.recv() => match req {
                    Some(Request::Disconnect { reason }) => return Ok(reason),
                    Some(req) => {
                        if let Some(reason) = self.handle_request(req, transport).await? {
                            return Ok(reason);
                        }
                    }
                    None => return Ok("client handles dropped".to_owned()),
                },
            }
        }
    }

    /// Decode and dispatch every complete line buffered so far.
    async fn process_buffer<T: Transport>(
        &mut self,
        transport: &mut T,
        buf: &mut BytesMut,
    ) -> Result<Option<String>, ClientError> {
        while let Some(line) = self.codec.decode(buf)? {
            if line.is_empty() {
                continue;
            }
            let msg = Message::parse(&line);
            debug!(command = %msg.command, "dispatching");
            let actions = self.session.handle_line(&msg);
            if let Some(reason) = self.perform(actions, transport).await? {
                return Ok(Some(reason));
            }
        }
        Ok(None)
    }

    async fn handle_request<T: Transport>(
        &mut self,
        req: Request,
        transport: &mut T,
    ) -> Result<Option<String>, ClientError> {
        let actions = match req {
            Request::Join(channel) => self.session.join_channel(&channel),
            Request::Part(channel) => self.session.part_channel(channel.as_deref()),
            Request::Privmsg { target, text } => {
                self.session.send_message(target.as_deref(), &text)
            }
            Request::Nick(nick) => self.session.change_nickname(&nick),
            Request::Raw(line) => {
                self.send_raw(&line, transport).await?;
                return Ok(None);
            }
            Request::History {
                target,
                count,
                reply,
            } => {
                let entries = match self.session.history_target(target.as_deref()) {
                    Some(target) => self.session.history().query(&target, count),
                    None => {
                        self.emit(Event::Failed(Failure::NoActiveChannel));
                        Vec::new()
                    }
                };
                let _ = reply.send(entries);
                return Ok(None);
            }
            Request::Disconnect { reason } => return Ok(Some(reason)),
        };
        self.perform(actions, transport).await
    }

    /// Execute session actions: write sends, forward notifications, and
    /// collect a shutdown signal if one was produced.
    async fn perform<T: Transport>(
        &mut self,
        actions: Vec<Action>,
        transport: &mut T,
    ) -> Result<Option<String>, ClientError> {
        let mut shutdown = None;
        for action in actions {
            match action {
                Action::Send(cmd) => {
                    let mut out = BytesMut::new();
                    self.codec.encode(&cmd, &mut out)?;
                    debug!(line = %cmd, "sending");
                    transport.send(&out).await?;
                }
                Action::Notify(event) => self.emit(event),
                Action::Shutdown(reason) => shutdown = Some(reason),
            }
        }
        Ok(shutdown)
    }

    async fn send_raw<T: Transport>(
        &mut self,
        line: &str,
        transport: &mut T,
    ) -> Result<(), ClientError> {
        let mut out = BytesMut::new();
        self.codec.encode(line, &mut out)?;
        debug!(line = %line, "sending raw");
        transport.send(&out).await?;
        Ok(())
    }

    /// The disconnect sequence: PART, QUIT, bounded drain, close, reset.
    ///
    /// Every step is best-effort; the identity reset and the `Terminated`
    /// notification happen no matter what fails along the way.
    async fn shutdown<T: Transport>(&mut self, transport: &mut T, buf: &mut BytesMut, reason: &str) {
        let farewell = self.session.begin_disconnect(reason);
        if let Err(e) = self.perform(farewell, transport).await {
            debug!(error = %e, "disconnect send failed");
        }

        // Bounded drain: process trailing messages until the server closes
        // its end or the timeout elapses. A hung server cannot stall
        // shutdown beyond the timeout.
        'drain: loop {
            match timeout(self.drain_timeout, transport.recv()).await {
                Ok(Ok(Some(bytes))) => {
                    buf.extend_from_slice(&bytes);
                    loop {
                        match self.codec.decode(buf) {
                            Ok(Some(line)) => {
                                if line.is_empty() {
                                    continue;
                                }
                                let msg = Message::parse(&line);
                                let actions = self.session.handle_line(&msg);
                                // Replies are best-effort this late; further
                                // shutdown signals are already moot.
                                let _ = self.perform(actions, transport).await;
                            }
                            Ok(None) => break,
                            Err(e) => {
                                debug!(error = %e, "drain decode error");
                                break 'drain;
                            }
                        }
                    }
                }
                Ok(Ok(None)) => break,  // clean end-of-stream
                Ok(Err(e)) => {
                    debug!(error = %e, "drain receive failed");
                    break;
                }
                Err(_) => break, // timeout elapsed
            }
        }

        if let Err(e) = transport.close().await {
            debug!(error = %e, "transport close failed");
        }

        // Unconditional: shutdown always leaves a clean disconnected state.
        self.session.finish_disconnect();
        info!(reason = %reason, "session terminated");
        self.emit(Event::Terminated {
            reason: reason.to_owned(),
        });
    }

    /// Notifications are fire-and-forget; a dropped receiver is fine.
    fn emit(&self, event: Event) {
        let _ = self.events.send(event);
    }
}
