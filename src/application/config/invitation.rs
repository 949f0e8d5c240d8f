use super::env_parse;

pub const MIN_EXPIRY_DAYS: i64 = 1;
pub const MAX_EXPIRY_DAYS: i64 = 30;

#[derive(Debug, Clone)]
pub struct InvitationConfig {
    pub default_expiry_days: i64,
    /// Seconds between expiry sweeps.
    pub sweep_interval_secs: u64,
}

impl InvitationConfig {
    pub fn from_env() -> Self {
        Self {
            default_expiry_days: env_parse("SNAPSERVE_INVITATION_EXPIRY_DAYS", 7)
                .clamp(MIN_EXPIRY_DAYS, MAX_EXPIRY_DAYS),
            sweep_interval_secs: env_parse("SNAPSERVE_INVITATION_SWEEP_SECS", 3600).max(1),
        }
    }
}
