//! Anchor-based patching of the xray daemon configuration.
//!
//! The daemon's configuration is a large JSON document hand-annotated with
//! sentinel comment lines marking six insertion zones (one per
//! protocol/transport pair). Parsing and re-serializing the whole document
//! would risk reordering or reformatting content the daemon is sensitive to,
//! so the panel edits it as line-oriented text instead: blocks are addressed
//! by generated marker lines and spliced in directly below their sentinel.
//! Exact byte-level insertion behavior is a compatibility contract with the
//! daemon's parser, not an implementation shortcut.

mod document;
mod error;
mod store;
mod zone;

pub use document::XrayDoc;
pub use error::PatchError;
pub use store::XrayStore;
pub use zone::{client_payload, marker_line, Zone};
