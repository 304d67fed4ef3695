//! Adaptive engine tuning derived from the playback policy.

use std::time::Duration;

use derivative::Derivative;
use derive_setters::Setters;

use crate::policy::PlaybackPolicy;

/// Settings handed to [`EngineFactory::create`](crate::EngineFactory::create).
#[derive(Clone, Debug, PartialEq, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
pub struct EngineConfig {
    /// Demux in a background worker. Default: true.
    #[derivative(Default(value = "true"))]
    pub enable_worker: bool,
    pub low_latency_mode: bool,
    /// Fetch the first fragment while the manifest is still being handled. Default: true.
    #[derivative(Default(value = "true"))]
    pub start_frag_prefetch: bool,
    /// Default: 2 s.
    #[derivative(Default(value = "Duration::from_secs(2)"))]
    pub max_starvation_delay: Duration,
    /// Forward buffer target. Default: 12 s.
    #[derivative(Default(value = "Duration::from_secs(12)"))]
    pub max_buffer_length: Duration,
    /// Default: 3 s.
    #[derivative(Default(value = "Duration::from_secs(3)"))]
    pub back_buffer_length: Duration,
    /// Limit renditions to the element size. Default: true.
    #[derivative(Default(value = "true"))]
    pub cap_level_to_player_size: bool,
    /// Bandwidth assumed before the first measurement. Default: 10 Mbps.
    #[derivative(Default(value = "10_000_000"))]
    pub default_bandwidth_estimate_bps: u64,
    /// Default: 1.2.
    #[derivative(Default(value = "1.2"))]
    pub bandwidth_factor: f64,
    /// Default: 1.3.
    #[derivative(Default(value = "1.3"))]
    pub bandwidth_up_factor: f64,
}

impl EngineConfig {
    /// High-quality startup buffers more, never caps to the element size and
    /// assumes a faster network before measuring.
    pub fn for_policy(policy: &PlaybackPolicy) -> Self {
        if !policy.selects_start_level() {
            return Self::default();
        }

        Self {
            max_buffer_length: Duration::from_secs(20),
            cap_level_to_player_size: false,
            default_bandwidth_estimate_bps: 20_000_000,
            bandwidth_factor: 1.3,
            bandwidth_up_factor: 1.4,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_keeps_engine_defaults() {
        let config = EngineConfig::for_policy(&PlaybackPolicy::default());
        assert_eq!(config, EngineConfig::default());
        assert!(config.cap_level_to_player_size);
        assert_eq!(config.max_buffer_length, Duration::from_secs(12));
    }

    #[test]
    fn hero_disables_player_size_cap() {
        let config = EngineConfig::for_policy(&PlaybackPolicy::default().with_hero_like(true));
        assert!(!config.cap_level_to_player_size);
        assert_eq!(config.max_buffer_length, Duration::from_secs(20));
        assert_eq!(config.default_bandwidth_estimate_bps, 20_000_000);
        assert!(config.enable_worker);
    }
}
