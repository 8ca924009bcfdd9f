//! Engine configuration.
//!
//! The scoring contract fixes shapes (monotonic speed decay, fixed hint
//! discount) but not coefficients; the concrete values live here and can be
//! overridden through the environment.

use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Multiplier applied to a correct answer submitted exactly at the
    /// deadline when points-for-speed is enabled. Awards decay linearly from
    /// 1.0 at t=0 down to this floor.
    pub speed_floor: f64,
    /// Multiplier applied to the award when the participant used a hint.
    pub hint_discount: f64,
    /// Seconds after leaving during which a participant may reconnect.
    pub reconnect_grace_seconds: u32,
    /// Geo acceptance radius in meters used when a question sets none.
    pub default_acceptance_radius_meters: f64,
    /// Upper bound for a single extend_time grant, seconds.
    pub max_extension_seconds: u32,
    /// Length of generated join codes.
    pub join_code_length: usize,
    /// When true, late submissions are discarded instead of being stored as
    /// zero-point responses for analytics.
    pub reject_late_responses: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            speed_floor: 0.5,
            hint_discount: 0.5,
            reconnect_grace_seconds: 120,
            default_acceptance_radius_meters: 1000.0,
            max_extension_seconds: 120,
            join_code_length: 6,
            reject_late_responses: false,
        }
    }
}

fn env_parsed<T: FromStr>(key: &str) -> Option<T> {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring unparseable {}={:?}", key, raw);
                None
            }
        },
        Err(_) => None,
    }
}

impl EngineConfig {
    /// Build a config from defaults, overridden by `MAPQUIZ_*` env vars.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = env_parsed::<f64>("MAPQUIZ_SPEED_FLOOR") {
            if (0.0..=1.0).contains(&v) {
                config.speed_floor = v;
            } else {
                tracing::warn!("MAPQUIZ_SPEED_FLOOR must be within 0..=1, keeping default");
            }
        }
        if let Some(v) = env_parsed::<f64>("MAPQUIZ_HINT_DISCOUNT") {
            if (0.0..=1.0).contains(&v) {
                config.hint_discount = v;
            } else {
                tracing::warn!("MAPQUIZ_HINT_DISCOUNT must be within 0..=1, keeping default");
            }
        }
        if let Some(v) = env_parsed("MAPQUIZ_RECONNECT_GRACE_SECONDS") {
            config.reconnect_grace_seconds = v;
        }
        if let Some(v) = env_parsed("MAPQUIZ_DEFAULT_ACCEPTANCE_RADIUS_METERS") {
            config.default_acceptance_radius_meters = v;
        }
        if let Some(v) = env_parsed("MAPQUIZ_MAX_EXTENSION_SECONDS") {
            config.max_extension_seconds = v;
        }
        if let Some(v) = env_parsed::<usize>("MAPQUIZ_JOIN_CODE_LENGTH") {
            // Join codes stay human-typeable
            if (4..=10).contains(&v) {
                config.join_code_length = v;
            } else {
                tracing::warn!("MAPQUIZ_JOIN_CODE_LENGTH must be within 4..=10, keeping default");
            }
        }
        if let Some(v) = env_parsed("MAPQUIZ_REJECT_LATE_RESPONSES") {
            config.reject_late_responses = v;
        }

        config
    }
}
