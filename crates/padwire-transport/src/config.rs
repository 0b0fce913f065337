use std::fmt;

/// Frames are delivered out of order. Not configurable.
pub const ORDERED: bool = false;

/// A lost frame is never resent. Not configurable.
pub const MAX_RETRANSMITS: u16 = 0;

/// Default data channel label.
pub const DEFAULT_LABEL: &str = "input";

/// Default limit on bytes queued inside the channel before new frames are skipped.
pub const DEFAULT_MAX_BUFFERED_AMOUNT: usize = 64 * 1024;

/// Public STUN server used when no ICE servers are configured.
pub const DEFAULT_STUN_URL: &str = "stun:stun.l.google.com:19302";

/// Configuration for the frame channel.
///
/// Delivery semantics ([`ORDERED`], [`MAX_RETRANSMITS`]) are part of the
/// protocol and exposed read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Data channel label announced to the remote side.
    pub label: String,
    /// Skip frames while more than this many bytes are waiting in the channel.
    pub max_buffered_amount: usize,
}

impl ChannelConfig {
    /// Always `false`.
    pub fn ordered(&self) -> bool {
        ORDERED
    }

    /// Always `0`.
    pub fn max_retransmits(&self) -> u16 {
        MAX_RETRANSMITS
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            max_buffered_amount: DEFAULT_MAX_BUFFERED_AMOUNT,
        }
    }
}

/// A STUN or TURN server used to establish connectivity.
#[derive(Clone, PartialEq, Eq)]
pub struct IceServer {
    /// Server URLs, e.g. `stun:host:3478` or `turn:host:3478`.
    pub urls: Vec<String>,
    /// TURN username.
    pub username: Option<String>,
    /// TURN credential. Redacted in debug output and never logged.
    pub credential: Option<String>,
}

impl IceServer {
    /// A STUN server with no credentials.
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }

    /// A TURN server with long-term credentials.
    pub fn turn(
        url: impl Into<String>,
        username: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            urls: vec![url.into()],
            username: Some(username.into()),
            credential: Some(credential.into()),
        }
    }

    /// The default server list: one public STUN server.
    pub fn defaults() -> Vec<Self> {
        vec![Self::stun(DEFAULT_STUN_URL)]
    }
}

impl fmt::Debug for IceServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("IceServer");
        dbg.field("urls", &self.urls)
            .field("username", &self.username);
        if let Some(credential) = &self.credential {
            dbg.field(
                "credential",
                &format_args!("<redacted:{} bytes>", credential.len()),
            );
        } else {
            dbg.field("credential", &Option::<String>::None);
        }
        dbg.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_semantics_are_fixed() {
        let config = ChannelConfig {
            label: "other".to_string(),
            max_buffered_amount: 1,
        };
        assert!(!config.ordered());
        assert_eq!(config.max_retransmits(), 0);
    }

    #[test]
    fn default_channel_config() {
        let config = ChannelConfig::default();
        assert_eq!(config.label, "input");
        assert_eq!(config.max_buffered_amount, DEFAULT_MAX_BUFFERED_AMOUNT);
    }

    #[test]
    fn default_ice_servers_are_stun_only() {
        let servers = IceServer::defaults();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].urls, vec![DEFAULT_STUN_URL.to_string()]);
        assert!(servers[0].credential.is_none());
    }

    #[test]
    fn debug_redacts_credential() {
        let server = IceServer::turn("turn:relay.example:3478", "padwire", "hunter2");
        let debug = format!("{server:?}");
        assert!(debug.contains("<redacted:7 bytes>"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("padwire"));
    }
}
