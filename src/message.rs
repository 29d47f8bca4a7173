//! Wire message formatting
//!
//! Every outbound line has the shape `[<origin>]: <text>`. Server notices
//! use the reserved origin token `SERVER`.

use crate::types::Identity;

/// Origin token used for server-generated notices
pub const SERVER_ORIGIN: &str = "SERVER";

/// Display name recorded when a client announces an empty name
pub const ANONYMOUS: &str = "Anonymous";

/// Who a broadcast line is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Synthetic sender for join/leave notices
    Server,
    /// A connected client
    Client(Identity),
}

impl Origin {
    /// The identity excluded from delivery, if any
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Origin::Server => None,
            Origin::Client(id) => Some(*id),
        }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Server => f.write_str(SERVER_ORIGIN),
            Origin::Client(id) => write!(f, "{}", id),
        }
    }
}

/// Server notices about membership changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Joined(Identity),
    Left(Identity),
}

impl Notice {
    /// Notice body, without the `[SERVER]: ` prefix
    pub fn text(&self) -> String {
        match self {
            Notice::Joined(id) => format!("{} has joined the chat.", id),
            Notice::Left(id) => format!("{} has left the chat.", id),
        }
    }
}

/// Format a broadcast line (without terminator)
pub fn format_line(origin: Origin, text: &str) -> String {
    format!("[{}]: {}", origin, text)
}

/// Normalize a self-reported display name
pub fn display_name(raw: &str) -> String {
    let name = raw.trim();
    if name.is_empty() {
        ANONYMOUS.to_string()
    } else {
        name.to_string()
    }
}
