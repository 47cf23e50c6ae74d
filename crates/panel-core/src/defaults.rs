//! Default values shared across crates.

/// Default account lifetime in days for non-trial accounts.
pub const DEFAULT_EXPIRED_DAYS: u32 = 30;

/// Trial account lifetime in days.
pub const TRIAL_DAYS: u32 = 1;

/// Default IP limit when the caller does not supply one.
pub const DEFAULT_IP_LIMIT: u32 = 1;

/// Default bug host baked into generated cards and links.
pub const DEFAULT_BUG_HOST: &str = "bug.com";

/// Attempts the trial namer gets before giving up.
pub const TRIAL_NAME_ATTEMPTS: u32 = 5;

/// Date format used in markers, ledgers and the catalog.
pub const EXPIRE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Bytes per quota unit (`quota_gb` is gibibytes).
pub const QUOTA_UNIT_BYTES: u64 = 1 << 30;
