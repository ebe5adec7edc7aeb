//! Inbound IRC message parsing.
//!
//! A message is `[:prefix] COMMAND [params...] [:trailing]`, space-separated,
//! where the trailing parameter may contain embedded spaces.
//!
//! # Reference
//! - RFC 2812 Section 2.3.1: Message format

use chrono::{DateTime, Utc};

/// A parsed inbound IRC message.
///
/// Produced once per protocol line and discarded after dispatch. Parsing
/// never fails: an empty (or whitespace-only) line yields the degenerate
/// message with an empty command and no parameters, and callers access
/// parameters through [`Message::param`] so a truncated message is a
/// reportable condition rather than a panic.
///
/// # Example
///
/// ```
/// use slirc_wire::Message;
///
/// let msg = Message::parse("PING :server1");
/// assert_eq!(msg.prefix, None);
/// assert_eq!(msg.command, "PING");
/// assert_eq!(msg.params, vec!["server1"]);
/// ```
#[derive(Clone, Debug)]
pub struct Message {
    /// Message origin (`nick!user@host` or a server name), without the `:`.
    pub prefix: Option<String>,
    /// The command, uppercased. May be a 3-digit numeric reply as text.
    /// Empty only for the degenerate empty-line parse.
    pub command: String,
    /// Ordered parameters. The last may contain spaces if it was introduced
    /// by a leading `:` on the wire.
    pub params: Vec<String>,
    /// When this message was received.
    pub received_at: DateTime<Utc>,
}

impl Message {
    /// Parse a raw protocol line (with or without its CR-LF terminator).
    pub fn parse(raw: &str) -> Message {
        let line = raw.trim();
        if line.is_empty() {
            return Message {
                prefix: None,
                command: String::new(),
                params: Vec::new(),
                received_at: Utc::now(),
            };
        }

        let parts: Vec<&str> = line.split(' ').collect();
        let mut idx = 0;

        let prefix = match parts[0].strip_prefix(':') {
            Some(p) => {
                idx += 1;
                Some(p.to_owned())
            }
            None => None,
        };

        let command = parts
            .get(idx)
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or_default();
        idx += 1;

        let mut params = Vec::new();
        while idx < parts.len() {
            if let Some(rest) = parts[idx].strip_prefix(':') {
                // Trailing parameter: rejoin everything after the colon,
                // preserving interior spacing.
                let mut trailing = rest.to_owned();
                for tok in &parts[idx + 1..] {
                    trailing.push(' ');
                    trailing.push_str(tok);
                }
                params.push(trailing);
                break;
            }
            params.push(parts[idx].to_owned());
            idx += 1;
        }

        Message {
            prefix,
            command,
            params,
            received_at: Utc::now(),
        }
    }

    /// Get the parameter at `idx`, if present.
    pub fn param(&self, idx: usize) -> Option<&str> {
        self.params.get(idx).map(String::as_str)
    }

    /// Get the last parameter, if any. Useful as display text for commands
    /// the client has no dedicated handling for.
    pub fn last_param(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }

    /// Get the nickname portion of the prefix, if a prefix is present.
    ///
    /// For a server-name prefix (no `!`), this is the whole prefix.
    pub fn source_nick(&self) -> Option<&str> {
        match self.prefix.as_deref() {
            Some("") | None => None,
            Some(p) => Some(nick_of(p)),
        }
    }

    /// Interpret the command as a 3-digit numeric reply code.
    pub fn reply_code(&self) -> Option<u16> {
        if self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit()) {
            self.command.parse().ok()
        } else {
            None
        }
    }

    /// Whether this is the degenerate parse of an empty line.
    pub fn is_empty(&self) -> bool {
        self.command.is_empty()
    }
}

/// Extract the nickname from a message prefix.
///
/// Returns the substring before the first `!`, or the prefix unchanged when
/// it contains none (server-only prefixes such as hostnames).
pub fn nick_of(prefix: &str) -> &str {
    match prefix.find('!') {
        Some(bang) => &prefix[..bang],
        None => prefix,
    }
}
