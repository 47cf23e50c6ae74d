//! Line-addressed view of the daemon configuration.

use panel_core::{Protocol, Transport};

use crate::error::PatchError;
use crate::zone::{client_payload, marker_line, Zone};

/// The daemon configuration as a mutable ordered sequence of lines.
///
/// Conversion to and from text is byte-exact: the document is split on `\n`
/// and rejoined with `\n`, so a load/save cycle with no edits reproduces the
/// input, including a trailing newline (held as a final empty line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XrayDoc {
    lines: Vec<String>,
}

impl XrayDoc {
    pub fn parse(text: &str) -> Self {
        XrayDoc {
            lines: text.split('\n').map(String::from).collect(),
        }
    }

    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    /// Index of the anchor line for a zone.
    ///
    /// An anchor is any line ending with the zone's sentinel (the historical
    /// `sed /…$/` contract, which tolerates leading whitespace).
    pub fn find_anchor(&self, zone: Zone) -> Result<usize, PatchError> {
        self.lines
            .iter()
            .position(|line| line.ends_with(zone.sentinel))
            .ok_or(PatchError::AnchorNotFound {
                sentinel: zone.sentinel,
            })
    }

    /// Splice an account block immediately after the zone's anchor line.
    ///
    /// Always directly after the anchor, never after previously inserted
    /// entries: successive insertions accumulate in reverse-chronological
    /// order beneath the sentinel. External tooling depends on that order.
    pub fn insert_block(
        &mut self,
        protocol: Protocol,
        transport: Transport,
        username: &str,
        expire_date: &str,
        secret: &str,
    ) -> Result<(), PatchError> {
        let zone = Zone::lookup(protocol, transport)?;
        let anchor = self.find_anchor(zone)?;
        let payload = client_payload(protocol, secret, username);
        self.lines.insert(anchor + 1, payload);
        self.lines
            .insert(anchor + 1, marker_line(zone, username, expire_date));
        Ok(())
    }

    /// Remove the block whose marker matches `(username, expire_date)`.
    ///
    /// The range runs from the marker line through the next line beginning
    /// with the array-element join token `},{` inclusive; if no such closer
    /// exists the rest of the document is removed, matching the address
    /// range semantics the daemon's tooling has always used.
    pub fn delete_block(
        &mut self,
        protocol: Protocol,
        transport: Transport,
        username: &str,
        expire_date: &str,
    ) -> Result<(), PatchError> {
        let zone = Zone::lookup(protocol, transport)?;
        let marker = marker_line(zone, username, expire_date);
        let start = self
            .lines
            .iter()
            .position(|line| line.starts_with(&marker))
            .ok_or_else(|| PatchError::BlockNotFound {
                username: username.to_string(),
                expire_date: expire_date.to_string(),
            })?;
        let end = self.lines[start..]
            .iter()
            .position(|line| line.starts_with("},{"))
            .map(|offset| start + offset)
            .unwrap_or(self.lines.len() - 1);
        self.lines.drain(start..=end);
        Ok(())
    }

    /// Textual uniqueness probe: does any client entry carry this identity?
    ///
    /// Deliberately a substring scan rather than a structural parse, so it
    /// works on daemon config shapes the patcher does not otherwise
    /// understand.
    pub fn contains_user(&self, username: &str) -> bool {
        let needle = format!(r#""email": "{}""#, username);
        self.lines.iter().any(|line| line.contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
  "log": { "loglevel": "warning" },
  "inbounds": [
    {
      "port": 443,
      "protocol": "vmess",
      "settings": {
        "clients": [
          {
#vmess
          }
        ]
      }
    },
    {
      "protocol": "vmess",
      "settings": {
        "clients": [
          {
#vmessgrpc
          }
        ]
      }
    },
    {
      "protocol": "vless",
      "settings": {
        "clients": [
          {
#vless
          }
        ]
      }
    },
    {
      "protocol": "vless",
      "settings": {
        "clients": [
          {
#vlessgrpc
          }
        ]
      }
    },
    {
      "protocol": "trojan",
      "settings": {
        "clients": [
          {
#trojanws
          }
        ]
      }
    },
    {
      "protocol": "trojan",
      "settings": {
        "clients": [
          {
#trojangrpc
          }
        ]
      }
    }
  ]
}
"#;

    fn doc() -> XrayDoc {
        XrayDoc::parse(SAMPLE)
    }

    #[test]
    fn parse_round_trips_bytes() {
        assert_eq!(doc().to_text(), SAMPLE);
    }

    #[test]
    fn finds_every_anchor() {
        let doc = doc();
        for protocol in [Protocol::Trojan, Protocol::Vless, Protocol::Vmess] {
            for &transport in protocol.transports() {
                let zone = Zone::lookup(protocol, transport).unwrap();
                doc.find_anchor(zone).unwrap();
            }
        }
    }

    #[test]
    fn missing_anchor_is_fatal() {
        let doc = XrayDoc::parse("{\n}\n");
        let zone = Zone::lookup(Protocol::Trojan, Transport::Ws).unwrap();
        assert!(matches!(
            doc.find_anchor(zone),
            Err(PatchError::AnchorNotFound {
                sentinel: "#trojanws"
            })
        ));
    }

    #[test]
    fn insert_places_block_directly_under_anchor() {
        let mut doc = doc();
        doc.insert_block(Protocol::Trojan, Transport::Ws, "alice", "2026-09-06", "uuid-a")
            .unwrap();

        let zone = Zone::lookup(Protocol::Trojan, Transport::Ws).unwrap();
        let anchor = doc.find_anchor(zone).unwrap();
        assert_eq!(doc.lines[anchor + 1], "#! alice 2026-09-06");
        assert_eq!(
            doc.lines[anchor + 2],
            r#"},{"password": "uuid-a","email": "alice"}"#
        );
    }

    #[test]
    fn successive_inserts_accumulate_newest_first() {
        let mut doc = doc();
        doc.insert_block(Protocol::Vless, Transport::Ws, "first", "2026-01-01", "u1")
            .unwrap();
        doc.insert_block(Protocol::Vless, Transport::Ws, "second", "2026-01-02", "u2")
            .unwrap();

        let zone = Zone::lookup(Protocol::Vless, Transport::Ws).unwrap();
        let anchor = doc.find_anchor(zone).unwrap();
        assert_eq!(doc.lines[anchor + 1], "#& second 2026-01-02");
        assert_eq!(doc.lines[anchor + 3], "#& first 2026-01-01");
    }

    #[test]
    fn delete_removes_marker_through_join_token() {
        let mut doc = doc();
        doc.insert_block(Protocol::Vmess, Transport::Grpc, "alice", "2026-09-06", "u")
            .unwrap();
        doc.delete_block(Protocol::Vmess, Transport::Grpc, "alice", "2026-09-06")
            .unwrap();
        assert_eq!(doc.to_text(), SAMPLE);
    }

    #[test]
    fn delete_unknown_block_reports_not_found() {
        let mut doc = doc();
        assert!(matches!(
            doc.delete_block(Protocol::Trojan, Transport::Ws, "ghost", "2026-01-01"),
            Err(PatchError::BlockNotFound { .. })
        ));
    }

    #[test]
    fn delete_requires_matching_expiry() {
        let mut doc = doc();
        doc.insert_block(Protocol::Trojan, Transport::Ws, "alice", "2026-09-06", "u")
            .unwrap();
        assert!(matches!(
            doc.delete_block(Protocol::Trojan, Transport::Ws, "alice", "2027-01-01"),
            Err(PatchError::BlockNotFound { .. })
        ));
    }

    #[test]
    fn grpc_marker_does_not_shadow_ws_marker() {
        // `#!#` lines must not match a `#!` deletion for the same user.
        let mut doc = doc();
        doc.insert_block(Protocol::Trojan, Transport::Ws, "alice", "2026-09-06", "u")
            .unwrap();
        doc.insert_block(Protocol::Trojan, Transport::Grpc, "alice", "2026-09-06", "u")
            .unwrap();
        doc.delete_block(Protocol::Trojan, Transport::Ws, "alice", "2026-09-06")
            .unwrap();

        let zone = Zone::lookup(Protocol::Trojan, Transport::Grpc).unwrap();
        let anchor = doc.find_anchor(zone).unwrap();
        assert_eq!(doc.lines[anchor + 1], "#!# alice 2026-09-06");
    }

    #[test]
    fn interleaved_deletes_restore_anchor_neighborhood() {
        let mut doc = doc();
        let users = ["u1", "u2", "u3", "u4"];
        for (i, user) in users.iter().enumerate() {
            let expire = format!("2026-01-0{}", i + 1);
            doc.insert_block(Protocol::Vmess, Transport::Ws, user, &expire, "id")
                .unwrap();
        }
        // Delete out of insertion order.
        for &(user, expire) in &[
            ("u3", "2026-01-03"),
            ("u1", "2026-01-01"),
            ("u4", "2026-01-04"),
            ("u2", "2026-01-02"),
        ] {
            doc.delete_block(Protocol::Vmess, Transport::Ws, user, expire)
                .unwrap();
        }
        assert_eq!(doc.to_text(), SAMPLE);
    }

    #[test]
    fn contains_user_is_a_textual_probe() {
        let mut doc = doc();
        assert!(!doc.contains_user("alice"));
        doc.insert_block(Protocol::Vless, Transport::Grpc, "alice", "2026-09-06", "u")
            .unwrap();
        assert!(doc.contains_user("alice"));
        // Substring of another user's name must not match.
        assert!(!doc.contains_user("alic"));
    }
}
