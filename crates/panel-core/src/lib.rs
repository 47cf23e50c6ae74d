//! Core domain types for the VPN panel.
//!
//! This crate defines the account model shared by every store: protocols and
//! their transports, create requests, resolved accounts ready for
//! provisioning, validation rules, and the trial-account naming capability.

pub mod account;
pub mod defaults;
pub mod protocol;
pub mod trial;
pub mod validate;

pub use account::{Account, CreateRequest, Credential};
pub use protocol::{Protocol, Transport};
pub use trial::{RandomNamer, TrialNamer, TrialPolicy};
pub use validate::{validate_request, validate_username, ValidationError};
