//! Connection identity and registration lifecycle.

/// Registration lifecycle of a connection.
///
/// `Disconnected -> Registering -> Registered -> Disconnected`; the terminal
/// state is reentrant (a client object can connect again).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum RegistrationState {
    /// No transport attached.
    #[default]
    Disconnected,
    /// NICK/USER sent, awaiting welcome (001).
    Registering,
    /// Received 001; the server accepted the registration.
    Registered,
}

/// Who this client is on the network.
///
/// Owned by the session; mutated only through the single client task. The
/// nickname is updated optimistically when a NICK is sent and becomes
/// authoritative on server confirmation.
#[derive(Clone, Debug)]
pub struct Identity {
    /// Current nickname.
    pub nickname: String,
    /// Username (ident) sent at registration.
    pub username: String,
    /// Real name / GECOS sent at registration.
    pub realname: String,
    /// True only after numeric 001 has been received.
    pub registered: bool,
    /// Consecutive 433 collisions for the current registration attempt.
    pub nick_attempts: u32,
    /// The single channel this client is currently in, if any.
    pub current_channel: Option<String>,
}

impl Identity {
    /// Create a fresh identity for a new client.
    pub fn new(
        nickname: impl Into<String>,
        username: impl Into<String>,
        realname: impl Into<String>,
    ) -> Self {
        Self {
            nickname: nickname.into(),
            username: username.into(),
            realname: realname.into(),
            registered: false,
            nick_attempts: 0,
            current_channel: None,
        }
    }

    /// Reset the per-connection fields. Runs unconditionally on disconnect;
    /// the nickname itself is kept for the next connection attempt.
    pub fn reset(&mut self) {
        self.registered = false;
        self.nick_attempts = 0;
        self.current_channel = None;
    }
}
