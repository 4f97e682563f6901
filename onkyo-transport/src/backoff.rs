use std::time::Duration;

use crate::config::ReconnectConfig;

/// Delay before reconnection attempt `attempt` (0-based)
///
/// Doubles from `initial_delay`, capped at `max_delay`, then spread by up to
/// +-25% with a jitter derived from the attempt number so that results are
/// reproducible.
pub fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = attempt.min(30) as i32;
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_attempt_uses_initial_delay() {
        let config = ReconnectConfig::default();
        assert_eq!(calculate_backoff(0, &config), Duration::from_millis(500));
    }

    #[test]
    fn test_backoff_grows_within_jitter() {
        let config = ReconnectConfig::default();
        for attempt in 1..3 {
            let nominal = 0.5 * 2.0_f64.powi(attempt as i32);
            let delay = calculate_backoff(attempt, &config).as_secs_f64();
            assert!(delay >= nominal * 0.75 - 1e-9, "attempt {attempt}: {delay}");
            assert!(delay <= nominal * 1.25 + 1e-9, "attempt {attempt}: {delay}");
        }
    }

    #[test]
    fn test_backoff_is_capped() {
        let config = ReconnectConfig::default();
        for attempt in 4..200 {
            let delay = calculate_backoff(attempt, &config);
            assert!(delay <= Duration::from_secs_f64(5.0 * 1.25 + 1e-6));
            assert!(delay >= Duration::from_secs_f64(5.0 * 0.75 - 1e-6));
        }
    }

    #[test]
    fn test_backoff_is_deterministic() {
        let config = ReconnectConfig::default();
        assert_eq!(calculate_backoff(7, &config), calculate_backoff(7, &config));
    }
}
