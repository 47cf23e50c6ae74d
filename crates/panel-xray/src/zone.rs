//! Sentinel and marker tables for the six insertion zones.

use panel_core::{Protocol, Transport};

use crate::error::PatchError;

/// One insertion zone in the daemon config: the fixed sentinel comment that
/// anchors it and the marker prefix its account blocks carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone {
    pub sentinel: &'static str,
    pub marker: &'static str,
}

impl Zone {
    /// Look up the zone for a protocol/transport pair.
    ///
    /// The sentinel and marker bytes are a wire contract with the daemon
    /// and with external tooling that greps these files; they must not
    /// change.
    pub fn lookup(protocol: Protocol, transport: Transport) -> Result<Zone, PatchError> {
        let zone = match (protocol, transport) {
            (Protocol::Trojan, Transport::Ws) => Zone {
                sentinel: "#trojanws",
                marker: "#!",
            },
            (Protocol::Trojan, Transport::Grpc) => Zone {
                sentinel: "#trojangrpc",
                marker: "#!#",
            },
            (Protocol::Vless, Transport::Ws) => Zone {
                sentinel: "#vless",
                marker: "#&",
            },
            (Protocol::Vless, Transport::Grpc) => Zone {
                sentinel: "#vlessgrpc",
                marker: "#&&",
            },
            (Protocol::Vmess, Transport::Ws) => Zone {
                sentinel: "#vmess",
                marker: "###",
            },
            (Protocol::Vmess, Transport::Grpc) => Zone {
                sentinel: "#vmessgrpc",
                marker: "##",
            },
            (Protocol::Ssh, _) => return Err(PatchError::NoZone(protocol)),
        };
        Ok(zone)
    }
}

/// Marker line identifying one account block: `<prefix> <username> <expire>`.
pub fn marker_line(zone: Zone, username: &str, expire_date: &str) -> String {
    format!("{} {} {}", zone.marker, username, expire_date)
}

/// The JSON fragment spliced below the marker line.
///
/// The leading `},{` closes the previous array element and opens this one,
/// keeping the surrounding clients array valid after a pure line insertion.
pub fn client_payload(protocol: Protocol, secret: &str, username: &str) -> String {
    match protocol {
        Protocol::Trojan => format!(r#"}},{{"password": "{}","email": "{}"}}"#, secret, username),
        Protocol::Vless => format!(r#"}},{{"id": "{}","email": "{}"}}"#, secret, username),
        Protocol::Vmess => format!(
            r#"}},{{"id": "{}","alterId": 0,"email": "{}"}}"#,
            secret, username
        ),
        Protocol::Ssh => String::new(),
    }
}
