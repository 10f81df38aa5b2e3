//! Configuration types for edge-engine

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Root configuration structure
///
/// One versioned struct covering every subsystem. Injected at construction;
/// no module reads configuration from the environment on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version, bumped on incompatible changes
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub signal: SignalConfig,
    #[serde(default)]
    pub sizing: SizingConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub breaker: BreakerConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            signal: SignalConfig::default(),
            sizing: SizingConfig::default(),
            risk: RiskConfig::default(),
            breaker: BreakerConfig::default(),
            engine: EngineConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

/// Signal generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Minimum absolute edge to act on
    #[serde(default = "default_min_edge")]
    pub min_edge: Decimal,

    /// Minimum model confidence to act on
    #[serde(default = "default_min_confidence")]
    pub min_confidence: Decimal,

    /// Minimum market liquidity in dollars; markets with unknown liquidity pass
    #[serde(default = "default_min_liquidity")]
    pub min_liquidity: Decimal,
}

fn default_min_edge() -> Decimal {
    Decimal::new(5, 2) // 0.05
}
fn default_min_confidence() -> Decimal {
    Decimal::new(55, 2) // 0.55
}
fn default_min_liquidity() -> Decimal {
    Decimal::new(500, 0)
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            min_edge: default_min_edge(),
            min_confidence: default_min_confidence(),
            min_liquidity: default_min_liquidity(),
        }
    }
}

/// Position sizing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingConfig {
    /// Fractional Kelly multiplier (0.25 = quarter Kelly)
    #[serde(default = "default_kelly_fraction")]
    pub kelly_fraction: Decimal,

    /// Maximum position as a fraction of equity
    #[serde(default = "default_max_position_pct")]
    pub max_position_pct: Decimal,

    /// Minimum position size in dollars
    #[serde(default = "default_min_position_size")]
    pub min_position_size: Decimal,
}

fn default_kelly_fraction() -> Decimal {
    Decimal::new(25, 2) // 0.25
}
fn default_max_position_pct() -> Decimal {
    Decimal::new(5, 2) // 0.05
}
fn default_min_position_size() -> Decimal {
    Decimal::new(10, 0)
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            kelly_fraction: default_kelly_fraction(),
            max_position_pct: default_max_position_pct(),
            min_position_size: default_min_position_size(),
        }
    }
}

/// Risk admission configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Maximum concurrent open positions
    #[serde(default = "default_max_open_positions")]
    pub max_open_positions: usize,

    /// Maximum single position as a fraction of total value
    #[serde(default = "default_max_position_pct")]
    pub max_position_pct: Decimal,

    /// Maximum total exposure as a fraction of total value
    #[serde(default = "default_max_total_exposure_pct")]
    pub max_total_exposure_pct: Decimal,

    /// Daily loss limit as a fraction of total value
    #[serde(default = "default_max_daily_loss_pct")]
    pub max_daily_loss_pct: Decimal,
}

fn default_max_open_positions() -> usize {
    20
}
fn default_max_total_exposure_pct() -> Decimal {
    Decimal::new(50, 2) // 0.50
}
fn default_max_daily_loss_pct() -> Decimal {
    Decimal::new(5, 2) // 0.05
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_open_positions: default_max_open_positions(),
            max_position_pct: default_max_position_pct(),
            max_total_exposure_pct: default_max_total_exposure_pct(),
            max_daily_loss_pct: default_max_daily_loss_pct(),
        }
    }
}

/// Circuit breaker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Drawdown from peak that trips the breaker
    #[serde(default = "default_max_drawdown_pct")]
    pub max_drawdown_pct: Decimal,

    /// Seconds to stay open before probing
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: u64,

    /// Consecutive losing trades that trip the breaker
    #[serde(default = "default_consecutive_loss_threshold")]
    pub consecutive_loss_threshold: u32,

    /// Non-losing trades required in half-open before closing again
    #[serde(default = "default_recovery_trades")]
    pub recovery_trades: u32,
}

fn default_max_drawdown_pct() -> Decimal {
    Decimal::new(15, 2) // 0.15
}
fn default_cooldown_seconds() -> u64 {
    3600
}
fn default_consecutive_loss_threshold() -> u32 {
    5
}
fn default_recovery_trades() -> u32 {
    3
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            max_drawdown_pct: default_max_drawdown_pct(),
            cooldown_seconds: default_cooldown_seconds(),
            consecutive_loss_threshold: default_consecutive_loss_threshold(),
            recovery_trades: default_recovery_trades(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Starting cash for a fresh account
    #[serde(default = "default_initial_bankroll")]
    pub initial_bankroll: Decimal,

    /// Maximum markets processed concurrently in a batch
    #[serde(default = "default_max_concurrent_markets")]
    pub max_concurrent_markets: usize,
}

fn default_initial_bankroll() -> Decimal {
    Decimal::new(10_000, 0)
}
fn default_max_concurrent_markets() -> usize {
    8
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_bankroll: default_initial_bankroll(),
            max_concurrent_markets: default_max_concurrent_markets(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Prometheus scrape port; 0 disables the exporter
    #[serde(default)]
    pub metrics_port: u16,

    /// Default log level when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_port: 0,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Persist configuration to a TOML file
    ///
    /// Settings changed at runtime must survive a restart, so every change
    /// goes through this rather than living only in memory.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_match_documented_limits() {
        let config = Config::default();
        assert_eq!(config.version, 1);
        assert_eq!(config.signal.min_edge, dec!(0.05));
        assert_eq!(config.signal.min_confidence, dec!(0.55));
        assert_eq!(config.signal.min_liquidity, dec!(500));
        assert_eq!(config.sizing.kelly_fraction, dec!(0.25));
        assert_eq!(config.sizing.max_position_pct, dec!(0.05));
        assert_eq!(config.sizing.min_position_size, dec!(10));
        assert_eq!(config.risk.max_open_positions, 20);
        assert_eq!(config.risk.max_total_exposure_pct, dec!(0.50));
        assert_eq!(config.risk.max_daily_loss_pct, dec!(0.05));
        assert_eq!(config.breaker.max_drawdown_pct, dec!(0.15));
        assert_eq!(config.breaker.cooldown_seconds, 3600);
        assert_eq!(config.breaker.consecutive_loss_threshold, 5);
        assert_eq!(config.breaker.recovery_trades, 3);
    }

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            version = 1

            [signal]
            min_edge = 0.04
            min_confidence = 0.60
            min_liquidity = 1000.0

            [sizing]
            kelly_fraction = 0.5
            max_position_pct = 0.10
            min_position_size = 5.0

            [risk]
            max_open_positions = 10
            max_position_pct = 0.10
            max_total_exposure_pct = 0.40
            max_daily_loss_pct = 0.03

            [breaker]
            max_drawdown_pct = 0.20
            cooldown_seconds = 1800
            consecutive_loss_threshold = 4
            recovery_trades = 2

            [engine]
            initial_bankroll = 5000.0
            max_concurrent_markets = 4

            [telemetry]
            metrics_port = 9090
            log_level = "debug"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.signal.min_edge, dec!(0.04));
        assert_eq!(config.sizing.kelly_fraction, dec!(0.5));
        assert_eq!(config.risk.max_open_positions, 10);
        assert_eq!(config.breaker.cooldown_seconds, 1800);
        assert_eq!(config.engine.max_concurrent_markets, 4);
        assert_eq!(config.telemetry.metrics_port, 9090);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let toml = r#"
            [signal]
            min_edge = 0.08
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.signal.min_edge, dec!(0.08));
        assert_eq!(config.signal.min_confidence, dec!(0.55));
        assert_eq!(config.risk.max_open_positions, 20);
    }

    #[test]
    fn test_config_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.signal.min_edge = dec!(0.07);
        config.breaker.cooldown_seconds = 600;
        config.save(&path).unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.signal.min_edge, dec!(0.07));
        assert_eq!(reloaded.breaker.cooldown_seconds, 600);
        assert_eq!(reloaded.version, config.version);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }
}
