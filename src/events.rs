//! Notifications emitted to the presentation layer.
//!
//! The core never renders output. Everything a CLI or GUI would show arrives
//! here as a structured event; failures carry a classified reason.

use std::fmt;

/// A structured notification for a front-end to render.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Event {
    /// The transport connected and registration has begun.
    Connected {
        /// `host:port` of the server.
        server: String,
    },
    /// Numeric 001 received; the server accepted our registration.
    Registered {
        /// The nickname the server accepted.
        nickname: String,
    },
    /// A nickname changed.
    NickChanged {
        /// Previous nickname.
        old: String,
        /// New nickname.
        new: String,
        /// Whether it was our own rename.
        is_self: bool,
    },
    /// Someone joined a channel.
    Joined {
        /// The channel.
        channel: String,
        /// Who joined.
        who: String,
        /// Whether we joined.
        is_self: bool,
    },
    /// Someone left a channel.
    Parted {
        /// The channel.
        channel: String,
        /// Who left.
        who: String,
        /// Whether we left.
        is_self: bool,
    },
    /// A PRIVMSG arrived.
    Message {
        /// Sender nickname.
        from: String,
        /// Channel or nickname the message was addressed to.
        target: String,
        /// Message text.
        text: String,
        /// True when the target is not a channel (directly addressed).
        private: bool,
    },
    /// A names list (numeric 353) for a channel.
    Names {
        /// The channel.
        channel: String,
        /// Members with their roles.
        members: Vec<Member>,
    },
    /// Someone quit the network.
    Quit {
        /// Who quit.
        who: String,
        /// Quit reason (may be empty).
        reason: String,
        /// Whether it was our own quit echoed back.
        is_self: bool,
    },
    /// Text from a command the client has no dedicated handling for.
    Notice {
        /// The raw message prefix (may be empty).
        from: String,
        /// Display text (the message's last parameter).
        text: String,
    },
    /// A classified failure. Fatal ones are followed by `Terminated`.
    Failed(Failure),
    /// The session ended; transport closed and identity reset.
    Terminated {
        /// Why the session ended.
        reason: String,
    },
}

/// One member of a channel, from a names list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    /// Nickname, without the role marker.
    pub nick: String,
    /// Channel role parsed from the marker.
    pub role: MemberRole,
}

/// Channel role markers in a names list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberRole {
    /// `@` - channel operator.
    Operator,
    /// `+` - voiced.
    Voiced,
    /// No marker.
    Regular,
}

/// Classified failure reasons.
///
/// Soft failures never end the session; fatal ones clear the running flag
/// and trigger an orderly shutdown.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Failure {
    /// 432 - the server rejected the nickname's format.
    ErroneousNickname {
        /// The rejected nickname.
        nick: String,
    },
    /// 433 - the nickname is taken.
    NickInUse {
        /// The colliding nickname.
        nick: String,
        /// The replacement being attempted, if the retry budget allows one.
        retrying_as: Option<String>,
    },
    /// The 433 retry budget is exhausted. Fatal only before registration.
    NickAttemptsExhausted {
        /// The last nickname tried.
        nick: String,
    },
    /// 465 - banned from the server. Always fatal.
    BannedFromServer,
    /// 471 - the channel is full.
    ChannelFull {
        /// The channel that refused us.
        channel: String,
    },
    /// 473 - the channel is invite-only.
    InviteOnly {
        /// The channel that refused us.
        channel: String,
    },
    /// 474 - banned from the channel.
    BannedFromChannel {
        /// The channel that refused us.
        channel: String,
    },
    /// 475 - the channel requires a key.
    ChannelKeyRequired {
        /// The channel that refused us.
        channel: String,
    },
    /// The server sent an ERROR command. Always fatal.
    ServerError {
        /// The server's error text.
        text: String,
    },
    /// An inbound message was missing an expected parameter.
    Malformed {
        /// The command the truncated message carried.
        command: String,
    },
    /// An operation needed a target but no channel is joined.
    NoActiveChannel,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ErroneousNickname { nick } => write!(f, "invalid nickname format: {}", nick),
            Self::NickInUse {
                nick,
                retrying_as: Some(next),
            } => write!(f, "nickname {} in use, trying {}", nick, next),
            Self::NickInUse {
                nick,
                retrying_as: None,
            } => write!(f, "nickname {} in use", nick),
            Self::NickAttemptsExhausted { nick } => {
                write!(f, "no available nickname (last tried {})", nick)
            }
            Self::BannedFromServer => write!(f, "banned from this server"),
            Self::ChannelFull { channel } => write!(f, "channel {} is full", channel),
            Self::InviteOnly { channel } => write!(f, "channel {} is invite only", channel),
            Self::BannedFromChannel { channel } => write!(f, "banned from channel {}", channel),
            Self::ChannelKeyRequired { channel } => {
                write!(f, "channel {} requires a key", channel)
            }
            Self::ServerError { text } => write!(f, "server error: {}", text),
            Self::Malformed { command } => {
                write!(f, "malformed {} message from server", command)
            }
            Self::NoActiveChannel => write!(f, "no target specified and not in a channel"),
        }
    }
}
