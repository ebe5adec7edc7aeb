//! Numeric reply codes the client reacts to.
//!
//! Servers report command results as three-digit numerics; this is the fixed
//! subset the client gives dedicated handling. Anything else falls through
//! to generic display.
//!
//! # Reference
//! - RFC 2812 Section 5: Replies

#![allow(non_camel_case_types)]

/// A numeric server reply with dedicated client handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Reply {
    /// 001 - Welcome; registration is complete.
    RPL_WELCOME = 1,
    /// 353 - Channel names list.
    RPL_NAMREPLY = 353,
    /// 432 - Erroneous nickname.
    ERR_ERRONEUSNICKNAME = 432,
    /// 433 - Nickname already in use.
    ERR_NICKNAMEINUSE = 433,
    /// 465 - Banned from this server.
    ERR_YOUREBANNEDCREEP = 465,
    /// 471 - Channel is full.
    ERR_CHANNELISFULL = 471,
    /// 473 - Channel is invite-only.
    ERR_INVITEONLYCHAN = 473,
    /// 474 - Banned from the channel.
    ERR_BANNEDFROMCHAN = 474,
    /// 475 - Channel requires a key.
    ERR_BADCHANNELKEY = 475,
}

impl Reply {
    /// Look up a reply by numeric code.
    pub fn from_code(code: u16) -> Option<Reply> {
        match code {
            1 => Some(Reply::RPL_WELCOME),
            353 => Some(Reply::RPL_NAMREPLY),
            432 => Some(Reply::ERR_ERRONEUSNICKNAME),
            433 => Some(Reply::ERR_NICKNAMEINUSE),
            465 => Some(Reply::ERR_YOUREBANNEDCREEP),
            471 => Some(Reply::ERR_CHANNELISFULL),
            473 => Some(Reply::ERR_INVITEONLYCHAN),
            474 => Some(Reply::ERR_BANNEDFROMCHAN),
            475 => Some(Reply::ERR_BADCHANNELKEY),
            _ => None,
        }
    }

    /// The numeric code for this reply.
    pub fn code(self) -> u16 {
        self as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_known() {
        assert_eq!(Reply::from_code(1), Some(Reply::RPL_WELCOME));
        assert_eq!(Reply::from_code(433), Some(Reply::ERR_NICKNAMEINUSE));
        assert_eq!(Reply::from_code(475), Some(Reply::ERR_BADCHANNELKEY));
    }

    #[test]
    fn test_from_code_unknown() {
        assert_eq!(Reply::from_code(372), None);
        assert_eq!(Reply::from_code(0), None);
    }

    #[test]
    fn test_code_round_trip() {
        for code in [1u16, 353, 432, 433, 465, 471, 473, 474, 475] {
            let reply = Reply::from_code(code).unwrap();
            assert_eq!(reply.code(), code);
        }
    }
}
