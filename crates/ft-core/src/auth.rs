//! Auth credential and the session events shared between the HTTP
//! gateway and the embedding shell.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Storage key the bearer credential lives under.
pub const AUTH_TOKEN_KEY: &str = "AUTH_TOKEN";

/// Bearer credential sent as `Authorization: token <value>`.
///
/// Debug output is redacted so a token never leaks through logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(redacted)")
    }
}

/// Process-wide session notifications emitted by the HTTP gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A 401 arrived. The stored credential has already been cleared;
    /// the shell must reset navigation to the sign-in entry point.
    Expired,
}

pub type SessionEventSender = mpsc::UnboundedSender<SessionEvent>;
pub type SessionEventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Channel carrying session events from the gateway to the shell.
pub fn session_channel() -> (SessionEventSender, SessionEventReceiver) {
    mpsc::unbounded_channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_never_prints_the_token() {
        let token = AuthToken::new("secret-value");
        let debug = format!("{token:?}");
        assert!(!debug.contains("secret-value"));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let token = AuthToken::new("tok-1");
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"tok-1\"");
        let back: AuthToken = serde_json::from_str("\"tok-1\"").unwrap();
        assert_eq!(back, token);
    }
}
