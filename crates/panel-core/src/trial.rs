//! Trial account policy and username generation.
//!
//! Trial accounts use system-chosen usernames and fixed policy limits, not
//! caller-supplied values. Candidate names are drawn from a protocol prefix
//! plus a numeric suffix; on collision the caller asks again with a widened
//! range, up to a bounded attempt count.

use rand::Rng;

use crate::defaults::TRIAL_DAYS;
use crate::protocol::Protocol;

/// Fixed per-protocol trial limits.
#[derive(Debug, Clone, Copy)]
pub struct TrialPolicy {
    pub prefix: &'static str,
    pub quota_gb: u64,
    pub ip_limit: u32,
    pub days: u32,
}

impl TrialPolicy {
    pub fn for_protocol(protocol: Protocol) -> Self {
        match protocol {
            Protocol::Ssh => TrialPolicy {
                prefix: "Trial-SSH-",
                quota_gb: 0,
                ip_limit: 2,
                days: TRIAL_DAYS,
            },
            Protocol::Trojan => TrialPolicy {
                prefix: "Trial-",
                quota_gb: 1,
                ip_limit: 3,
                days: TRIAL_DAYS,
            },
            Protocol::Vless => TrialPolicy {
                prefix: "WV-",
                quota_gb: 1,
                ip_limit: 2,
                days: TRIAL_DAYS,
            },
            Protocol::Vmess => TrialPolicy {
                prefix: "WV-",
                quota_gb: 1,
                ip_limit: 3,
                days: TRIAL_DAYS,
            },
        }
    }
}

/// Candidate-name source for trial accounts.
///
/// `widened` is false for the first attempt and true for retries after a
/// collision, which switches to the larger suffix range.
pub trait TrialNamer: Send + Sync {
    fn next_candidate(&self, protocol: Protocol, widened: bool) -> String;

    /// Random throwaway password for ssh trials.
    fn trial_password(&self) -> String;
}

/// Default namer backed by the thread RNG.
#[derive(Debug, Default)]
pub struct RandomNamer;

impl TrialNamer for RandomNamer {
    fn next_candidate(&self, protocol: Protocol, widened: bool) -> String {
        let policy = TrialPolicy::for_protocol(protocol);
        let suffix: u32 = if widened {
            rand::thread_rng().gen_range(1000..10000)
        } else {
            rand::thread_rng().gen_range(100..1000)
        };
        format!("{}{}", policy.prefix, suffix)
    }

    fn trial_password(&self) -> String {
        format!("ssh{}", rand::thread_rng().gen_range(1000..10000))
    }
}
