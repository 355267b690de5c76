// crates/scribe-server/src/config/mod.rs
// Configuration and shared constants

pub mod env;
pub mod file;

pub use env::EnvOverrides;
pub use file::ScribeConfig;

use chrono::{Duration, Weekday};
use tracing::warn;

/// Default base cooldown between suggestions, in minutes
pub const DEFAULT_COOLDOWN_MINUTES: i64 = 30;

/// Accepted cooldown range; values outside fall back to the default
pub const COOLDOWN_RANGE_MINUTES: std::ops::RangeInclusive<i64> = 1..=720;

/// Default weekday for the weekly digest
pub const DEFAULT_DIGEST_WEEKDAY: Weekday = Weekday::Fri;

/// Fully-resolved engine settings (config file + env overrides, validated).
///
/// Malformed values never fail startup; they fall back to the defaults.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Proactive mode master switch
    pub enabled: bool,
    /// Base cooldown before adaptive adjustments
    pub base_cooldown: Duration,
    /// Day of week the weekly digest may fire
    pub digest_weekday: Weekday,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_cooldown: Duration::minutes(DEFAULT_COOLDOWN_MINUTES),
            digest_weekday: DEFAULT_DIGEST_WEEKDAY,
        }
    }
}

impl EngineSettings {
    /// Merge file config and env overrides. Env wins over file, file over defaults.
    pub fn resolve(file: &ScribeConfig, env: &EnvOverrides) -> Self {
        let defaults = Self::default();

        let enabled = if env.disabled {
            false
        } else {
            file.proactive.enabled.unwrap_or(defaults.enabled)
        };

        let cooldown_minutes = env
            .cooldown_minutes
            .or(file.proactive.cooldown_minutes)
            .map(validate_cooldown)
            .unwrap_or(DEFAULT_COOLDOWN_MINUTES);

        let digest_weekday = env
            .digest_weekday
            .as_deref()
            .or(file.proactive.digest_weekday.as_deref())
            .map(parse_weekday)
            .unwrap_or(DEFAULT_DIGEST_WEEKDAY);

        Self {
            enabled,
            base_cooldown: Duration::minutes(cooldown_minutes),
            digest_weekday,
        }
    }

    /// Load from the standard locations (~/.scribe/config.toml + SCRIBE_* env)
    pub fn load() -> Self {
        Self::resolve(&ScribeConfig::load(), &EnvOverrides::from_env())
    }
}

/// Clamp out-of-range cooldowns back to the default (silent fallback).
fn validate_cooldown(minutes: i64) -> i64 {
    if COOLDOWN_RANGE_MINUTES.contains(&minutes) {
        minutes
    } else {
        warn!(
            minutes,
            "cooldown outside accepted range, using default of {} minutes",
            DEFAULT_COOLDOWN_MINUTES
        );
        DEFAULT_COOLDOWN_MINUTES
    }
}

/// Parse a weekday name ("friday", "Fri", ...), falling back to the default.
fn parse_weekday(s: &str) -> Weekday {
    match s.trim().to_ascii_lowercase().as_str() {
        "mon" | "monday" => Weekday::Mon,
        "tue" | "tues" | "tuesday" => Weekday::Tue,
        "wed" | "wednesday" => Weekday::Wed,
        "thu" | "thur" | "thurs" | "thursday" => Weekday::Thu,
        "fri" | "friday" => Weekday::Fri,
        "sat" | "saturday" => Weekday::Sat,
        "sun" | "sunday" => Weekday::Sun,
        other => {
            warn!(value = other, "invalid digest weekday, using default");
            DEFAULT_DIGEST_WEEKDAY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EngineSettings::default();
        assert!(settings.enabled);
        assert_eq!(settings.base_cooldown, Duration::minutes(30));
        assert_eq!(settings.digest_weekday, Weekday::Fri);
    }

    #[test]
    fn test_invalid_weekday_falls_back() {
        assert_eq!(parse_weekday("someday"), Weekday::Fri);
        assert_eq!(parse_weekday("Monday"), Weekday::Mon);
        assert_eq!(parse_weekday(" wed "), Weekday::Wed);
    }

    #[test]
    fn test_out_of_range_cooldown_falls_back() {
        assert_eq!(validate_cooldown(0), DEFAULT_COOLDOWN_MINUTES);
        assert_eq!(validate_cooldown(-5), DEFAULT_COOLDOWN_MINUTES);
        assert_eq!(validate_cooldown(10_000), DEFAULT_COOLDOWN_MINUTES);
        assert_eq!(validate_cooldown(45), 45);
    }

    #[test]
    fn test_env_wins_over_file() {
        let file: ScribeConfig = toml::from_str(
            r#"
[proactive]
enabled = true
cooldown_minutes = 15
digest_weekday = "monday"
"#,
        )
        .unwrap();
        let env = EnvOverrides {
            disabled: true,
            cooldown_minutes: Some(60),
            digest_weekday: Some("saturday".to_string()),
            db_path: None,
        };
        let settings = EngineSettings::resolve(&file, &env);
        assert!(!settings.enabled);
        assert_eq!(settings.base_cooldown, Duration::minutes(60));
        assert_eq!(settings.digest_weekday, Weekday::Sat);
    }

    #[test]
    fn test_file_config_applies_without_env() {
        let file: ScribeConfig = toml::from_str(
            r#"
[proactive]
cooldown_minutes = 15
"#,
        )
        .unwrap();
        let settings = EngineSettings::resolve(&file, &EnvOverrides::default());
        assert!(settings.enabled);
        assert_eq!(settings.base_cooldown, Duration::minutes(15));
    }
}
