//! Protocol and transport variants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account protocol variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// OS-level SSH account (no daemon config entry).
    Ssh,
    Trojan,
    Vless,
    Vmess,
}

impl Protocol {
    /// All protocols, in provisioning order.
    pub const ALL: [Protocol; 4] = [
        Protocol::Ssh,
        Protocol::Trojan,
        Protocol::Vless,
        Protocol::Vmess,
    ];

    /// Canonical lowercase name, used in paths, ledgers and the catalog.
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Ssh => "ssh",
            Protocol::Trojan => "trojan",
            Protocol::Vless => "vless",
            Protocol::Vmess => "vmess",
        }
    }

    /// Transports provisioned in the daemon config for this protocol.
    ///
    /// SSH accounts live in the OS identity store, not the daemon config,
    /// so they have no transports.
    pub fn transports(self) -> &'static [Transport] {
        match self {
            Protocol::Ssh => &[],
            _ => &[Transport::Ws, Transport::Grpc],
        }
    }

    pub fn is_ssh(self) -> bool {
        matches!(self, Protocol::Ssh)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = UnknownProtocol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ssh" => Ok(Protocol::Ssh),
            "trojan" => Ok(Protocol::Trojan),
            "vless" => Ok(Protocol::Vless),
            "vmess" => Ok(Protocol::Vmess),
            _ => Err(UnknownProtocol(s.to_string())),
        }
    }
}

/// Error for unrecognized protocol names.
#[derive(Debug, thiserror::Error)]
#[error("unknown protocol: {0}")]
pub struct UnknownProtocol(pub String);

/// Transport sub-variant within the daemon config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Ws,
    Grpc,
}

impl Transport {
    pub fn as_str(self) -> &'static str {
        match self {
            Transport::Ws => "ws",
            Transport::Grpc => "grpc",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trip() {
        for proto in Protocol::ALL {
            assert_eq!(proto.as_str().parse::<Protocol>().unwrap(), proto);
        }
        assert!("socks".parse::<Protocol>().is_err());
    }

    #[test]
    fn ssh_has_no_transports() {
        assert!(Protocol::Ssh.transports().is_empty());
        assert_eq!(
            Protocol::Trojan.transports(),
            &[Transport::Ws, Transport::Grpc]
        );
    }
}
