//! # slirc-wire
//!
//! Client-side IRC wire protocol support for the Straylight IRC client:
//! parsing raw protocol lines into structured messages, encoding outbound
//! commands, and CR-LF line framing over a byte stream.
//!
//! This crate is deliberately limited to the classic RFC 1459/2812 subset a
//! client actually exercises; it knows nothing about connections or state.
//!
//! ## Quick Start
//!
//! ```rust
//! use slirc_wire::{Command, Message};
//!
//! let msg = Message::parse(":nick!user@host PRIVMSG #channel :Hello World!");
//! assert_eq!(msg.command, "PRIVMSG");
//! assert_eq!(msg.source_nick(), Some("nick"));
//! assert_eq!(msg.param(1), Some("Hello World!"));
//!
//! let out = Command::PRIVMSG("#channel".into(), "hi there".into());
//! assert_eq!(out.to_string(), "PRIVMSG #channel :hi there");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod chan;
pub mod command;
pub mod error;
pub mod line;
pub mod message;
pub mod reply;

pub use self::chan::{ensure_channel_name, ChannelExt};
pub use self::command::Command;
pub use self::error::{ProtocolError, Result};
pub use self::line::{LineCodec, MAX_LINE_LEN};
pub use self::message::{nick_of, Message};
pub use self::reply::Reply;
