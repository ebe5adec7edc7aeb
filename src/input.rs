//! Slash-command interpreter for user input lines.
//!
//! Pure parsing only: a line becomes a closed [`Input`] variant and the
//! front-end (or [`crate::client::Handle`]) decides what to do with it.
//! Rendering usage text and help is the presentation layer's job.

/// Default number of entries a `/history` request shows.
pub const DEFAULT_HISTORY_COUNT: usize = 10;

/// A parsed user input line.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Input {
    /// Plain text: a message to the current channel.
    Say(String),
    /// `/join <channel>`
    Join(String),
    /// `/part` - leave the current channel.
    Part,
    /// `/nick [new]` - change nickname, or query the current one with `None`.
    Nick(Option<String>),
    /// `/msg <target> <text>`
    Msg {
        /// Nickname or channel to address.
        target: String,
        /// Message text.
        text: String,
    },
    /// `/history [target] [count]`
    History {
        /// Target to show; `None` means the current channel.
        target: Option<String>,
        /// How many entries to show.
        count: usize,
    },
    /// `/quit`
    Quit,
    /// `/help`
    Help,
    /// A slash-command missing its required arguments; carries usage text.
    Usage(&'static str),
    /// An unrecognized slash-command.
    Unknown(String),
    /// Nothing but whitespace.
    Empty,
}

impl Input {
    /// Parse one line of user input.
    pub fn parse(line: &str) -> Input {
        let line = line.trim();
        if line.is_empty() {
            return Input::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Input::Say(line.to_owned());
        };

        let mut parts = rest.split_whitespace();
        let Some(cmd) = parts.next() else {
            return Input::Empty;
        };
        let args: Vec<&str> = parts.collect();

        match cmd.to_ascii_lowercase().as_str() {
            "join" => match args.first() {
                Some(channel) => Input::Join((*channel).to_owned()),
                None => Input::Usage("/join #channel"),
            },
            "part" => Input::Part,
            "nick" => Input::Nick(args.first().map(|s| (*s).to_owned())),
            "msg" => {
                if args.len() >= 2 {
                    Input::Msg {
                        target: args[0].to_owned(),
                        text: args[1..].join(" "),
                    }
                } else {
                    Input::Usage("/msg <nickname> <message>")
                }
            }
            "history" => parse_history(&args),
            "quit" => Input::Quit,
            "help" => Input::Help,
            other => Input::Unknown(other.to_owned()),
        }
    }
}

/// `/history [target] [count]` - a bare number is a count, anything else is
/// a target, and a trailing number overrides the count.
fn parse_history(args: &[&str]) -> Input {
    let mut count = DEFAULT_HISTORY_COUNT;
    let mut target = None;

    if let Some(first) = args.first() {
        match first.parse::<usize>() {
            Ok(n) => count = n,
            Err(_) => target = Some((*first).to_owned()),
        }
        if let Some(Ok(n)) = args.get(1).map(|s| s.parse::<usize>()) {
            count = n;
        }
    }

    Input::History { target, count }
}
