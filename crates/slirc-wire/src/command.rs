//! Outbound IRC commands.
//!
//! Each variant renders to its exact wire form via `Display`; whether the
//! final field carries a `:` prefix is decided by the variant, never sniffed
//! from content (a `USER` realname is always colon-prefixed, a `PONG` token
//! never is). The CR-LF terminator is appended by
//! [`crate::line::LineCodec`], not here.
//!
//! # Reference
//! - RFC 2812 Sections 3.1-3.7

use std::fmt;

/// An outbound IRC command with its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Command {
    /// `NICK nickname`
    NICK(String),
    /// `USER username 0 * :realname`
    USER(String, String),
    /// `JOIN channel`
    JOIN(String),
    /// `PART channel`
    PART(String),
    /// `PRIVMSG target :text`
    PRIVMSG(String, String),
    /// `PONG token`
    PONG(String),
    /// `QUIT :reason`
    QUIT(String),
    /// A raw, caller-assembled line (escape hatch for front-ends).
    Raw(String),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::NICK(nick) => write!(f, "NICK {}", nick),
            Command::USER(username, realname) => {
                write!(f, "USER {} 0 * :{}", username, realname)
            }
            Command::JOIN(channel) => write!(f, "JOIN {}", channel),
            Command::PART(channel) => write!(f, "PART {}", channel),
            Command::PRIVMSG(target, text) => write!(f, "PRIVMSG {} :{}", target, text),
            Command::PONG(token) => write!(f, "PONG {}", token),
            Command::QUIT(reason) => write!(f, "QUIT :{}", reason),
            Command::Raw(line) => f.write_str(line),
        }
    }
}
