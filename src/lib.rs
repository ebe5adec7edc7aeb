//! slirc - Straylight IRC Client protocol core.
//!
//! A client-side implementation of the IRC wire protocol: it drives a
//! connection through registration and nickname negotiation, dispatches
//! incoming events to state-mutating handlers, and keeps bounded per-target
//! conversation history. The core never renders anything; front-ends consume
//! the [`events::Event`] stream and issue [`client::Request`]s through a
//! [`client::Handle`].
//!
//! Architecture:
//! - [`slirc_wire`] (re-exported as [`wire`]) parses and frames protocol
//!   lines.
//! - [`session::Session`] is the sans-IO state machine: it consumes parsed
//!   messages and returns actions (send / notify / shutdown) without doing
//!   any I/O itself.
//! - [`client::Client`] is the driver: a single task that owns the session,
//!   the history store, and the transport, serializing every state mutation.
//! - [`transport::Transport`] abstracts the byte stream; a tokio TCP
//!   implementation is provided.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod history;
pub mod input;
pub mod session;
pub mod state;
pub mod transport;

pub use self::client::{Client, Handle, Request};
pub use self::config::Config;
pub use self::error::ClientError;
pub use self::events::{Event, Failure, Member, MemberRole};
pub use self::history::{HistoryEntry, HistoryStore};
pub use self::input::Input;
pub use self::session::{Action, Session};
pub use self::state::{Identity, RegistrationState};
pub use self::transport::{TcpTransport, Transport};

pub use slirc_wire as wire;
