//! Channel name utilities.
//!
//! # Reference
//! - RFC 2812 Section 1.3: Channel names

/// Extension trait for recognizing IRC channel names.
pub trait ChannelExt {
    /// Check whether this string names a channel: it starts with one of the
    /// channel sigils (`#`, `&`, `+`, `!`) and contains no space or comma.
    fn is_channel_name(&self) -> bool;
}

impl ChannelExt for &str {
    fn is_channel_name(&self) -> bool {
        let mut chars = self.chars();

        match chars.next() {
            Some('#' | '&' | '+' | '!') => {}
            _ => return false,
        }

        chars.all(|c| c != ' ' && c != ',' && !c.is_control())
    }
}

impl ChannelExt for String {
    fn is_channel_name(&self) -> bool {
        self.as_str().is_channel_name()
    }
}

/// Normalize a user-supplied channel name, prepending `#` when no channel
/// sigil is present. A name already carrying a sigil is returned unchanged.
pub fn ensure_channel_name(name: &str) -> String {
    if name.is_channel_name() {
        name.to_owned()
    } else {
        format!("#{}", name)
    }
}
