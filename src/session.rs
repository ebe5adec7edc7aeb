//! Connection state machine and inbound event dispatch.
//!
//! [`Session`] is sans-IO: it consumes parsed messages and user intents and
//! returns [`Action`]s (messages to send, notifications to emit, or a
//! shutdown signal). The driver in [`crate::client`] performs the I/O. This
//! keeps every transition unit-testable without a socket or a runtime.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tracing::{debug, info, warn};

use slirc_wire::{ensure_channel_name, ChannelExt, Command, Message, Reply};

use crate::events::{Event, Failure, Member, MemberRole};
use crate::history::HistoryStore;
use crate::state::{Identity, RegistrationState};

/// Default bound on consecutive 433 nickname collisions.
pub const DEFAULT_MAX_NICK_ATTEMPTS: u32 = 5;

/// What the state machine wants its driver to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Send this command to the server.
    Send(Command),
    /// Emit this notification to the presentation layer.
    Notify(Event),
    /// The session is over; run the orderly shutdown sequence.
    Shutdown(String),
}

/// The connection state machine, dispatcher, and history owner.
#[derive(Debug)]
pub struct Session {
    identity: Identity,
    phase: RegistrationState,
    history: HistoryStore,
    max_nick_attempts: u32,
}

impl Session {
    /// Create a session around an identity.
    pub fn new(identity: Identity, history_limit: usize, max_nick_attempts: u32) -> Self {
        Self {
            identity,
            phase: RegistrationState::Disconnected,
            history: HistoryStore::new(history_limit),
            max_nick_attempts,
        }
    }

    /// Current identity.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Current registration phase.
    pub fn phase(&self) -> &RegistrationState {
        &self.phase
    }

    /// The per-target message history.
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Begin registration after the transport has connected: NICK then USER,
    /// back to back. Either acknowledgement order is tolerated; only numeric
    /// 001 marks the registration as accepted.
    pub fn start(&mut self) -> Vec<Action> {
        self.phase = RegistrationState::Registering;
        self.identity.nick_attempts = 0;
        vec![
            Action::Send(Command::NICK(self.identity.nickname.clone())),
            Action::Send(Command::USER(
                self.identity.username.clone(),
                self.identity.realname.clone(),
            )),
        ]
    }

    /// Dispatch one inbound message.
    pub fn handle_line(&mut self, msg: &Message) -> Vec<Action> {
        // PING is answered before any other dispatch; servers enforce
        // PING/PONG timeouts.
        if msg.command == "PING" {
            return match msg.param(0) {
                Some(token) => vec![Action::Send(Command::PONG(token.to_owned()))],
                None => vec![self.malformed(msg)],
            };
        }

        if let Some(code) = msg.reply_code() {
            return self.handle_numeric(code, msg);
        }

        match msg.command.as_str() {
            "QUIT" => self.handle_quit(msg),
            "ERROR" => self.handle_error(msg),
            "NICK" => self.handle_nick(msg),
            "JOIN" => self.handle_join(msg),
            "PART" => self.handle_part(msg),
            "PRIVMSG" => self.handle_privmsg(msg),
            _ => self.handle_unrecognized(msg),
        }
    }

    fn handle_numeric(&mut self, code: u16, msg: &Message) -> Vec<Action> {
        match Reply::from_code(code) {
            Some(Reply::RPL_WELCOME) => self.handle_welcome(),
            Some(Reply::ERR_ERRONEUSNICKNAME) => self.handle_erroneous_nickname(),
            Some(Reply::ERR_NICKNAMEINUSE) => self.handle_nick_in_use(),
            Some(Reply::ERR_YOUREBANNEDCREEP) => vec![
                Action::Notify(Event::Failed(Failure::BannedFromServer)),
                Action::Shutdown("banned from server".to_owned()),
            ],
            Some(Reply::RPL_NAMREPLY) => self.handle_names(msg),
            Some(Reply::ERR_CHANNELISFULL) => {
                self.handle_join_failure(msg, |channel| Failure::ChannelFull { channel })
            }
            Some(Reply::ERR_INVITEONLYCHAN) => {
                self.handle_join_failure(msg, |channel| Failure::InviteOnly { channel })
            }
            Some(Reply::ERR_BANNEDFROMCHAN) => {
                self.handle_join_failure(msg, |channel| Failure::BannedFromChannel { channel })
            }
            Some(Reply::ERR_BADCHANNELKEY) => {
                self.handle_join_failure(msg, |channel| Failure::ChannelKeyRequired { channel })
            }
            // Unknown numerics carry server text (MOTD and friends); surface
            // the last parameter like any other unrecognized command.
            _ => self.handle_unrecognized(msg),
        }
    }

    fn handle_welcome(&mut self) -> Vec<Action> {
        if self.identity.registered {
            return vec![];
        }
        info!(nickname = %self.identity.nickname, "registered with server");
        self.identity.registered = true;
        self.phase = RegistrationState::Registered;
        vec![Action::Notify(Event::Registered {
            nickname: self.identity.nickname.clone(),
        })]
    }

    fn handle_erroneous_nickname(&mut self) -> Vec<Action> {
        let mut actions = vec![Action::Notify(Event::Failed(Failure::ErroneousNickname {
            nick: self.identity.nickname.clone(),
        }))];
        // Distinct failure class from "in use": synthesize a fresh nickname
        // without touching the collision counter.
        if !self.identity.registered {
            let fallback = fallback_nickname(&self.identity.nickname);
            debug!(fallback = %fallback, "erroneous nickname, trying fallback");
            self.identity.nickname = fallback.clone();
            actions.push(Action::Send(Command::NICK(fallback)));
        }
        actions
    }

    fn handle_nick_in_use(&mut self) -> Vec<Action> {
        self.identity.nick_attempts += 1;
        if self.identity.nick_attempts < self.max_nick_attempts {
            let next = format!("{}{}", self.identity.nickname, self.identity.nick_attempts);
            let failure = Failure::NickInUse {
                nick: self.identity.nickname.clone(),
                retrying_as: Some(next.clone()),
            };
            self.identity.nickname = next.clone();
            vec![
                Action::Notify(Event::Failed(failure)),
                Action::Send(Command::NICK(next)),
            ]
        } else {
            warn!(
                nickname = %self.identity.nickname,
                attempts = self.identity.nick_attempts,
                "nickname retry budget exhausted"
            );
            let mut actions = vec![Action::Notify(Event::Failed(
                Failure::NickAttemptsExhausted {
                    nick: self.identity.nickname.clone(),
                },
            ))];
            // Fatal only when we never managed to register; a collision on a
            // later user-initiated rename leaves the session running.
            if !self.identity.registered {
                actions.push(Action::Shutdown("no available nickname".to_owned()));
            }
            actions
        }
    }

    fn handle_names(&mut self, msg: &Message) -> Vec<Action> {
        // :server 353 me = #channel :@op +voiced plain
        let (Some(channel), Some(list)) = (msg.param(2), msg.param(3)) else {
            return vec![self.malformed(msg)];
        };
        let members = list
            .split_whitespace()
            .map(|token| {
                if let Some(nick) = token.strip_prefix('@') {
                    Member {
                        nick: nick.to_owned(),
                        role: MemberRole::Operator,
                    }
                } else if let Some(nick) = token.strip_prefix('+') {
                    Member {
                        nick: nick.to_owned(),
                        role: MemberRole::Voiced,
                    }
                } else {
                    Member {
                        nick: token.to_owned(),
                        role: MemberRole::Regular,
                    }
                }
            })
            .collect();
        vec![Action::Notify(Event::Names {
            channel: channel.to_owned(),
            members,
        })]
    }

    fn handle_join_failure(
        &mut self,
        msg: &Message,
        make: impl FnOnce(String) -> Failure,
    ) -> Vec<Action> {
        // :server 47x me #channel :reason text
        let Some(channel) = msg.param(1) else {
            return vec![self.malformed(msg)];
        };
        // The join never happened; current_channel is left untouched.
        vec![Action::Notify(Event::Failed(make(channel.to_owned())))]
    }

    fn handle_quit(&mut self, msg: &Message) -> Vec<Action> {
        let who = msg.source_nick().unwrap_or_default().to_owned();
        let reason = msg.param(0).unwrap_or_default().to_owned();
        let is_self = who == self.identity.nickname;
        // A self-quit is only a notification; the disconnect sequence is the
        // one path that closes the transport.
        vec![Action::Notify(Event::Quit {
            who,
            reason,
            is_self,
        })]
    }

    fn handle_error(&mut self, msg: &Message) -> Vec<Action> {
        let text = msg.param(0).unwrap_or("unknown error").to_owned();
        warn!(error = %text, "server sent ERROR");
        vec![
            Action::Notify(Event::Failed(Failure::ServerError { text })),
            Action::Shutdown("server error".to_owned()),
        ]
    }

    fn handle_nick(&mut self, msg: &Message) -> Vec<Action> {
        let Some(new) = msg.param(0) else {
            return vec![self.malformed(msg)];
        };
        let old = msg.source_nick().unwrap_or_default().to_owned();
        let new = new.to_owned();
        let is_self = old == self.identity.nickname;
        if is_self {
            self.identity.nickname = new.clone();
        }
        vec![Action::Notify(Event::NickChanged { old, new, is_self })]
    }

    fn handle_join(&mut self, msg: &Message) -> Vec<Action> {
        let Some(channel) = msg.param(0) else {
            return vec![self.malformed(msg)];
        };
        let channel = channel.to_owned();
        let who = msg.source_nick().unwrap_or_default().to_owned();
        let is_self = who == self.identity.nickname;
        if is_self {
            self.identity.current_channel = Some(channel.clone());
        }
        vec![Action::Notify(Event::Joined {
            channel,
            who,
            is_self,
        })]
    }

    fn handle_part(&mut self, msg: &Message) -> Vec<Action> {
        let Some(channel) = msg.param(0) else {
            return vec![self.malformed(msg)];
        };
        let channel = channel.to_owned();
        let who = msg.source_nick().unwrap_or_default().to_owned();
        let is_self = who == self.identity.nickname;
        // Only our own PART of the channel we are in clears membership.
        if is_self && self.identity.current_channel.as_deref() == Some(channel.as_str()) {
            self.identity.current_channel = None;
        }
        vec![Action::Notify(Event::Parted {
            channel,
            who,
            is_self,
        })]
    }

    fn handle_privmsg(&mut self, msg: &Message) -> Vec<Action> {
        let (Some(target), Some(text)) = (msg.param(0), msg.param(1)) else {
            return vec![self.malformed(msg)];
        };
        let from = msg.source_nick().unwrap_or_default().to_owned();
        let target = target.to_owned();
        let text = text.to_owned();

        let private = !target.is_channel_name();
        if private {
            // Both sides of a private exchange accumulate under the peer's
            // nickname from our perspective.
            self.history.record(&from, from.clone(), text.clone());
        } else {
            self.history.record(&target, from.clone(), text.clone());
        }

        vec![Action::Notify(Event::Message {
            from,
            target,
            text,
            private,
        })]
    }

    fn handle_unrecognized(&mut self, msg: &Message) -> Vec<Action> {
        // Forward-compatible fallthrough: surface the last parameter as
        // display text when there is one.
        match msg.last_param() {
            Some(text) => vec![Action::Notify(Event::Notice {
                from: msg.prefix.clone().unwrap_or_default(),
                text: text.to_owned(),
            })],
            None => {
                debug!(command = %msg.command, "ignoring parameterless message");
                vec![]
            }
        }
    }

    fn malformed(&self, msg: &Message) -> Action {
        warn!(command = %msg.command, "message missing expected parameter");
        Action::Notify(Event::Failed(Failure::Malformed {
            command: msg.command.clone(),
        }))
    }

    // ---- user intents -----------------------------------------------------

    /// Join a channel, auto-prefixing `#` when no sigil is given.
    pub fn join_channel(&mut self, name: &str) -> Vec<Action> {
        vec![Action::Send(Command::JOIN(ensure_channel_name(name)))]
    }

    /// Leave the given channel, or the current one when `None`.
    pub fn part_channel(&mut self, channel: Option<&str>) -> Vec<Action> {
        let Some(channel) = channel
            .map(str::to_owned)
            .or_else(|| self.identity.current_channel.clone())
        else {
            return vec![Action::Notify(Event::Failed(Failure::NoActiveChannel))];
        };
        if self.identity.current_channel.as_deref() == Some(channel.as_str()) {
            self.identity.current_channel = None;
        }
        vec![Action::Send(Command::PART(channel))]
    }

    /// Send a message to `target`, or to the current channel when `None`.
    /// The outgoing message is recorded in history under the target.
    pub fn send_message(&mut self, target: Option<&str>, text: &str) -> Vec<Action> {
        let Some(target) = target
            .map(str::to_owned)
            .or_else(|| self.identity.current_channel.clone())
        else {
            return vec![Action::Notify(Event::Failed(Failure::NoActiveChannel))];
        };
        self.history
            .record(&target, self.identity.nickname.clone(), text);
        vec![Action::Send(Command::PRIVMSG(target, text.to_owned()))]
    }

    /// Request a nickname change. The identity is updated optimistically; a
    /// 433 reply walks it through the usual retry path.
    pub fn change_nickname(&mut self, new: &str) -> Vec<Action> {
        self.identity.nickname = new.to_owned();
        vec![Action::Send(Command::NICK(new.to_owned()))]
    }

    /// Resolve the target a history query refers to.
    pub fn history_target(&self, target: Option<&str>) -> Option<String> {
        target
            .map(str::to_owned)
            .or_else(|| self.identity.current_channel.clone())
    }

    // ---- disconnect -------------------------------------------------------

    /// First half of the disconnect sequence: PART the current channel if
    /// any, then QUIT. The driver follows with the bounded drain and calls
    /// [`Session::finish_disconnect`] unconditionally afterwards.
    pub fn begin_disconnect(&mut self, reason: &str) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(channel) = self.identity.current_channel.take() {
            actions.push(Action::Send(Command::PART(channel)));
        }
        actions.push(Action::Send(Command::QUIT(reason.to_owned())));
        actions
    }

    /// Final half of the disconnect sequence: reset identity and phase.
    /// Guaranteed to leave the session in a clean `Disconnected` state no
    /// matter how the drain or the transport teardown went.
    pub fn finish_disconnect(&mut self) {
        self.identity.reset();
        self.phase = RegistrationState::Disconnected;
    }
}

/// Deterministic fallback nickname for a 432 rejection: `Guest` plus a
/// three-digit hash of the rejected nickname. Collisions are tolerated; a
/// subsequent 433 drives the suffix-retry path.
fn fallback_nickname(current: &str) -> String {
    let mut hasher = DefaultHasher::new();
    current.hash(&mut hasher);
    format!("Guest{:03}", hasher.finish() % 1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::DEFAULT_HISTORY_LIMIT;

    fn make_session() -> Session {
        Session::new(
            Identity::new("wings", "wings", "Wings"),
            DEFAULT_HISTORY_LIMIT,
            DEFAULT_MAX_NICK_ATTEMPTS,
        )
    }

    fn feed(session: &mut Session, line: &str) -> Vec<Action> {
        session.handle_line(&Message::parse(line))
    }

    fn sent(actions: &[Action]) -> Vec<String> {
        actions
            .iter()
            .filter_map(|a| match a {
                Action::Send(cmd) => Some(cmd.to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_start_sends_nick_then_user() {
        let mut session = make_session();
        let actions = session.start();

        assert_eq!(session.phase(), &RegistrationState::Registering);
        assert_eq!(sent(&actions), ["NICK wings", "USER wings 0 * :Wings"]);
    }

    #[test]
    fn test_ping_answered_first_with_token() {
        let mut session = make_session();
        let actions = feed(&mut session, "PING :server1");
        assert_eq!(actions, vec![Action::Send(Command::PONG("server1".into()))]);
    }

    #[test]
    fn test_ping_without_token_is_reported_not_fatal() {
        let mut session = make_session();
        let actions = feed(&mut session, "PING");
        assert!(matches!(
            actions.as_slice(),
            [Action::Notify(Event::Failed(Failure::Malformed { .. }))]
        ));
    }

    #[test]
    fn test_welcome_registers_exactly_once() {
        let mut session = make_session();
        session.start();

        let actions = feed(&mut session, ":server 001 wings :Welcome to IRC");
        assert!(session.identity().registered);
        assert_eq!(session.phase(), &RegistrationState::Registered);
        assert_eq!(
            actions,
            vec![Action::Notify(Event::Registered {
                nickname: "wings".into()
            })]
        );

        // A duplicate 001 is a no-op.
        let actions = feed(&mut session, ":server 001 wings :Welcome again");
        assert!(actions.is_empty());
        assert!(session.identity().registered);
    }

    #[test]
    fn test_erroneous_nickname_falls_back_without_counting() {
        let mut session = make_session();
        session.start();

        let actions = feed(&mut session, ":server 432 * wings :Erroneous nickname");
        assert_eq!(session.identity().nick_attempts, 0);
        assert!(session.identity().nickname.starts_with("Guest"));
        assert_eq!(session.identity().nickname.len(), "Guest".len() + 3);
        let sends = sent(&actions);
        assert_eq!(sends.len(), 1);
        assert!(sends[0].starts_with("NICK Guest"));
    }

    #[test]
    fn test_erroneous_nickname_after_registration_only_reports() {
        let mut session = make_session();
        session.start();
        feed(&mut session, ":server 001 wings :Welcome");

        let actions = feed(&mut session, ":server 432 * bad :Erroneous nickname");
        assert!(sent(&actions).is_empty());
        assert_eq!(session.identity().nickname, "wings");
    }

    #[test]
    fn test_nick_in_use_suffixes_each_retry() {
        let mut session = make_session();
        session.start();

        let actions = feed(&mut session, ":server 433 * wings :Nickname in use");
        assert_eq!(session.identity().nickname, "wings1");
        assert_eq!(sent(&actions), ["NICK wings1"]);

        let actions = feed(&mut session, ":server 433 * wings1 :Nickname in use");
        assert_eq!(session.identity().nickname, "wings12");
        assert_eq!(sent(&actions), ["NICK wings12"]);
        assert_eq!(session.identity().nick_attempts, 2);
    }

    #[test]
    fn test_nick_in_use_five_times_before_registration_is_fatal() {
        let mut session = make_session();
        session.start();

        let mut last = Vec::new();
        for _ in 0..5 {
            last = feed(&mut session, ":server 433 * x :Nickname in use");
        }

        assert!(!session.identity().registered);
        assert_eq!(session.identity().nick_attempts, 5);
        assert!(last.iter().any(|a| matches!(a, Action::Shutdown(_))));
        assert!(last.iter().any(|a| matches!(
            a,
            Action::Notify(Event::Failed(Failure::NickAttemptsExhausted { .. }))
        )));
    }

    #[test]
    fn test_nick_in_use_after_registration_never_fatal() {
        let mut session = make_session();
        session.start();
        feed(&mut session, ":server 001 wings :Welcome");

        let mut last = Vec::new();
        for _ in 0..6 {
            last = feed(&mut session, ":server 433 * x :Nickname in use");
        }
        assert!(!last.iter().any(|a| matches!(a, Action::Shutdown(_))));
    }

    #[test]
    fn test_banned_from_server_is_fatal() {
        let mut session = make_session();
        let actions = feed(&mut session, ":server 465 wings :You are banned");
        assert!(actions
            .iter()
            .any(|a| matches!(a, Action::Notify(Event::Failed(Failure::BannedFromServer)))));
        assert!(actions.iter().any(|a| matches!(a, Action::Shutdown(_))));
    }

    #[test]
    fn test_error_command_is_fatal() {
        let mut session = make_session();
        let actions = feed(&mut session, "ERROR :Closing Link: spam");
        assert!(actions.iter().any(|a| matches!(
            a,
            Action::Notify(Event::Failed(Failure::ServerError { text })) if text == "Closing Link: spam"
        )));
        assert!(actions.iter().any(|a| matches!(a, Action::Shutdown(_))));
    }

    #[test]
    fn test_self_join_sets_current_channel() {
        let mut session = make_session();
        let actions = feed(&mut session, ":wings!w@host JOIN #test");
        assert_eq!(session.identity().current_channel.as_deref(), Some("#test"));
        assert_eq!(
            actions,
            vec![Action::Notify(Event::Joined {
                channel: "#test".into(),
                who: "wings".into(),
                is_self: true,
            })]
        );
    }

    #[test]
    fn test_other_join_reports_without_mutating() {
        let mut session = make_session();
        feed(&mut session, ":other!o@host JOIN #test");
        assert_eq!(session.identity().current_channel, None);
    }

    #[test]
    fn test_self_part_clears_matching_channel_only() {
        let mut session = make_session();
        feed(&mut session, ":wings!w@host JOIN #test");

        // A PART for a different channel leaves membership alone.
        feed(&mut session, ":wings!w@host PART #other");
        assert_eq!(session.identity().current_channel.as_deref(), Some("#test"));

        // A PART from someone else leaves it alone too.
        feed(&mut session, ":other!o@host PART #test");
        assert_eq!(session.identity().current_channel.as_deref(), Some("#test"));

        feed(&mut session, ":wings!w@host PART #test");
        assert_eq!(session.identity().current_channel, None);
    }

    #[test]
    fn test_self_nick_renames_identity() {
        let mut session = make_session();
        let actions = feed(&mut session, ":wings!w@host NICK :stray");
        assert_eq!(session.identity().nickname, "stray");
        assert_eq!(
            actions,
            vec![Action::Notify(Event::NickChanged {
                old: "wings".into(),
                new: "stray".into(),
                is_self: true,
            })]
        );
    }

    #[test]
    fn test_other_nick_does_not_touch_identity() {
        let mut session = make_session();
        feed(&mut session, ":other!o@host NICK :newname");
        assert_eq!(session.identity().nickname, "wings");
    }

    #[test]
    fn test_channel_privmsg_recorded_under_channel() {
        let mut session = make_session();
        let actions = feed(&mut session, ":alice!a@host PRIVMSG #test :Hello World!");

        let log = session.history().query("#test", 10);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].from, "alice");
        assert_eq!(log[0].text, "Hello World!");
        assert!(matches!(
            actions.as_slice(),
            [Action::Notify(Event::Message { private: false, .. })]
        ));
    }

    #[test]
    fn test_private_privmsg_recorded_under_sender() {
        let mut session = make_session();
        let actions = feed(&mut session, ":alice!a@host PRIVMSG wings :psst");

        let log = session.history().query("alice", 10);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].text, "psst");
        assert!(matches!(
            actions.as_slice(),
            [Action::Notify(Event::Message { private: true, .. })]
        ));
    }

    #[test]
    fn test_privmsg_without_text_is_reported_not_fatal() {
        let mut session = make_session();
        let actions = feed(&mut session, ":alice!a@host PRIVMSG #test");
        assert!(matches!(
            actions.as_slice(),
            [Action::Notify(Event::Failed(Failure::Malformed { command })) ] if command == "PRIVMSG"
        ));
    }

    #[test]
    fn test_names_list_parses_roles() {
        let mut session = make_session();
        let actions = feed(&mut session, ":server 353 wings = #test :@op +voiced plain");

        let Action::Notify(Event::Names { channel, members }) = &actions[0] else {
            panic!("expected names event, got {:?}", actions);
        };
        assert_eq!(channel, "#test");
        assert_eq!(
            members,
            &vec![
                Member {
                    nick: "op".into(),
                    role: MemberRole::Operator
                },
                Member {
                    nick: "voiced".into(),
                    role: MemberRole::Voiced
                },
                Member {
                    nick: "plain".into(),
                    role: MemberRole::Regular
                },
            ]
        );
    }

    #[test]
    fn test_join_failures_classified_and_nonfatal() {
        let cases = [
            (471, "channel #t is full"),
            (473, "channel #t is invite only"),
            (474, "banned from channel #t"),
            (475, "channel #t requires a key"),
        ];
        for (code, rendered) in cases {
            let mut session = make_session();
            feed(&mut session, ":wings!w@host JOIN #home");
            let line = format!(":server {} wings #t :denied", code);
            let actions = feed(&mut session, &line);

            let Action::Notify(Event::Failed(failure)) = &actions[0] else {
                panic!("expected failure for {}", code);
            };
            assert_eq!(failure.to_string(), rendered);
            assert!(!actions.iter().any(|a| matches!(a, Action::Shutdown(_))));
            // Membership is untouched by a failed join elsewhere.
            assert_eq!(session.identity().current_channel.as_deref(), Some("#home"));
        }
    }

    #[test]
    fn test_self_quit_is_notification_only() {
        let mut session = make_session();
        let actions = feed(&mut session, ":wings!w@host QUIT :Goodbye!");
        assert_eq!(
            actions,
            vec![Action::Notify(Event::Quit {
                who: "wings".into(),
                reason: "Goodbye!".into(),
                is_self: true,
            })]
        );
    }

    #[test]
    fn test_unknown_command_with_params_becomes_notice() {
        let mut session = make_session();
        let actions = feed(&mut session, ":server WALLOPS :the sky is falling");
        assert_eq!(
            actions,
            vec![Action::Notify(Event::Notice {
                from: "server".into(),
                text: "the sky is falling".into(),
            })]
        );
    }

    #[test]
    fn test_unknown_numeric_becomes_notice() {
        let mut session = make_session();
        let actions = feed(&mut session, ":server 372 wings :- MOTD line");
        assert_eq!(
            actions,
            vec![Action::Notify(Event::Notice {
                from: "server".into(),
                text: "- MOTD line".into(),
            })]
        );
    }

    #[test]
    fn test_join_channel_auto_prefixes() {
        let mut session = make_session();
        assert_eq!(sent(&session.join_channel("test")), ["JOIN #test"]);
        assert_eq!(sent(&session.join_channel("#test")), ["JOIN #test"]);
    }

    #[test]
    fn test_send_message_defaults_to_current_channel() {
        let mut session = make_session();
        feed(&mut session, ":wings!w@host JOIN #test");

        let actions = session.send_message(None, "hello");
        assert_eq!(sent(&actions), ["PRIVMSG #test :hello"]);
        // Our own message lands in history under the channel.
        let log = session.history().query("#test", 10);
        assert_eq!(log[0].from, "wings");
    }

    #[test]
    fn test_send_message_without_channel_fails_softly() {
        let mut session = make_session();
        let actions = session.send_message(None, "hello");
        assert_eq!(
            actions,
            vec![Action::Notify(Event::Failed(Failure::NoActiveChannel))]
        );
    }

    #[test]
    fn test_change_nickname_is_optimistic() {
        let mut session = make_session();
        let actions = session.change_nickname("stray");
        assert_eq!(session.identity().nickname, "stray");
        assert_eq!(sent(&actions), ["NICK stray"]);
    }

    #[test]
    fn test_disconnect_parts_then_quits_then_resets() {
        let mut session = make_session();
        session.start();
        feed(&mut session, ":server 001 wings :Welcome");
        feed(&mut session, ":wings!w@host JOIN #test");

        let actions = session.begin_disconnect("Goodbye!");
        assert_eq!(sent(&actions), ["PART #test", "QUIT :Goodbye!"]);

        session.finish_disconnect();
        assert!(!session.identity().registered);
        assert_eq!(session.identity().current_channel, None);
        assert_eq!(session.phase(), &RegistrationState::Disconnected);
    }

    #[test]
    fn test_disconnect_without_channel_skips_part() {
        let mut session = make_session();
        let actions = session.begin_disconnect("bye");
        assert_eq!(sent(&actions), ["QUIT :bye"]);
    }

    #[test]
    fn test_history_survives_disconnect() {
        let mut session = make_session();
        feed(&mut session, ":alice!a@host PRIVMSG #test :kept");
        session.begin_disconnect("bye");
        session.finish_disconnect();
        assert_eq!(session.history().query("#test", 10).len(), 1);
    }

    #[test]
    fn test_empty_line_is_ignored() {
        let mut session = make_session();
        let actions = feed(&mut session, "");
        // Degenerate parse has no params; nothing to report.
        assert!(actions.is_empty());
    }
}
