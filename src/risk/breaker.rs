//! Circuit breaker state machine

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::BreakerConfig;
use crate::telemetry::{record_counter, CounterMetric};

/// Breaker state
///
/// Closed permits trading; Open halts it; HalfOpen permits probationary
/// trades after the cooldown. The cycle has no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

/// What tripped the breaker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TripReason {
    /// Drawdown from peak reached the limit
    Drawdown(Decimal),
    /// Daily loss limit breached
    DailyLoss(Decimal),
    /// Consecutive losing trades reached the threshold
    ConsecutiveLosses(u32),
}

/// Finite-state machine gating all trading
///
/// Transitions: Closed -> Open on any trip condition; Open -> HalfOpen once
/// the cooldown elapses; HalfOpen -> Closed after the configured number of
/// consecutive non-losing trades; HalfOpen -> Open on any trip condition.
/// Every transition is logged with its trigger and timestamp.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    state: BreakerState,
    state_entered_at: DateTime<Utc>,
    consecutive_losses: u32,
    probe_successes: u32,
    max_daily_loss_pct: Decimal,
}

impl CircuitBreaker {
    /// Create a breaker in the Closed state
    pub fn new(config: BreakerConfig, max_daily_loss_pct: Decimal) -> Self {
        Self {
            config,
            state: BreakerState::Closed,
            state_entered_at: Utc::now(),
            consecutive_losses: 0,
            probe_successes: 0,
            max_daily_loss_pct,
        }
    }

    /// Current state
    pub fn state(&self) -> BreakerState {
        self.state
    }

    /// When the current state was entered
    pub fn state_entered_at(&self) -> DateTime<Utc> {
        self.state_entered_at
    }

    /// Consecutive losing trades observed
    pub fn consecutive_losses(&self) -> u32 {
        self.consecutive_losses
    }

    /// Whether trading is currently permitted
    ///
    /// An Open breaker flips to HalfOpen here once the cooldown has elapsed,
    /// so callers polling `check` drive the probation transition.
    pub fn check(&mut self, now: DateTime<Utc>) -> bool {
        if self.state == BreakerState::Open {
            let cooldown = Duration::seconds(self.config.cooldown_seconds as i64);
            if now - self.state_entered_at >= cooldown {
                self.transition(BreakerState::HalfOpen, now, "cooldown elapsed");
                self.probe_successes = 0;
            }
        }
        self.state != BreakerState::Open
    }

    /// Record the outcome of a closed trade
    pub fn record_trade_result(&mut self, pnl: Decimal, now: DateTime<Utc>) {
        if pnl < Decimal::ZERO {
            self.consecutive_losses += 1;
            if self.state == BreakerState::HalfOpen {
                self.probe_successes = 0;
            }
            if self.consecutive_losses >= self.config.consecutive_loss_threshold
                && self.state != BreakerState::Open
            {
                self.trip(TripReason::ConsecutiveLosses(self.consecutive_losses), now);
            }
            return;
        }

        self.consecutive_losses = 0;
        if self.state == BreakerState::HalfOpen {
            self.probe_successes += 1;
            if self.probe_successes >= self.config.recovery_trades {
                self.transition(BreakerState::Closed, now, "probation passed");
                self.probe_successes = 0;
            }
        }
    }

    /// Re-evaluate trip conditions after a new portfolio snapshot
    pub fn record_snapshot(
        &mut self,
        drawdown_pct: Decimal,
        daily_pnl: Decimal,
        total_value: Decimal,
        now: DateTime<Utc>,
    ) {
        if self.state == BreakerState::Open {
            return;
        }

        if drawdown_pct >= self.config.max_drawdown_pct {
            self.trip(TripReason::Drawdown(drawdown_pct), now);
            return;
        }

        if daily_pnl <= -(self.max_daily_loss_pct * total_value) {
            self.trip(TripReason::DailyLoss(daily_pnl), now);
        }
    }

    fn trip(&mut self, reason: TripReason, now: DateTime<Utc>) {
        warn!(
            from = ?self.state,
            ?reason,
            timestamp = %now,
            "Circuit breaker tripped"
        );
        self.state = BreakerState::Open;
        self.state_entered_at = now;
        self.probe_successes = 0;
        record_counter(CounterMetric::BreakerTrips, 1);
    }

    fn transition(&mut self, to: BreakerState, now: DateTime<Utc>, trigger: &str) {
        info!(
            from = ?self.state,
            to = ?to,
            trigger,
            timestamp = %now,
            "Circuit breaker transition"
        );
        self.state = to;
        self.state_entered_at = now;
        record_counter(CounterMetric::BreakerTransitions, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_breaker() -> CircuitBreaker {
        CircuitBreaker::new(BreakerConfig::default(), dec!(0.05))
    }

    #[test]
    fn test_starts_closed() {
        let mut breaker = make_breaker();
        assert_eq!(breaker.state(), BreakerState::Closed);
        assert!(breaker.check(Utc::now()));
    }

    #[test]
    fn test_trips_on_drawdown() {
        let mut breaker = make_breaker();
        let now = Utc::now();

        // 16% drawdown against a 15% limit
        breaker.record_snapshot(dec!(0.16), dec!(0), dec!(10000), now);
        assert_eq!(breaker.state(), BreakerState::Open);
        assert!(!breaker.check(now));
    }

    #[test]
    fn test_drawdown_exactly_at_limit_trips() {
        let mut breaker = make_breaker();
        let now = Utc::now();
        breaker.record_snapshot(dec!(0.15), dec!(0), dec!(10000), now);
        assert_eq!(breaker.state(), BreakerState::Open);
    }

    #[test]
    fn test_trips_on_daily_loss() {
        let mut breaker = make_breaker();
        let now = Utc::now();
        // $600 down on $10k, 5% limit is $500
        breaker.record_snapshot(dec!(0.01), dec!(-600), dec!(10000), now);
        assert_eq!(breaker.state(), BreakerState::Open);
    }

    #[test]
    fn test_trips_on_consecutive_losses() {
        let mut breaker = make_breaker();
        let now = Utc::now();

        for _ in 0..4 {
            breaker.record_trade_result(dec!(-10), now);
            assert_eq!(breaker.state(), BreakerState::Closed);
        }
        breaker.record_trade_result(dec!(-10), now);
        assert_eq!(breaker.state(), BreakerState::Open);
    }

    #[test]
    fn test_win_resets_loss_streak() {
        let mut breaker = make_breaker();
        let now = Utc::now();

        for _ in 0..4 {
            breaker.record_trade_result(dec!(-10), now);
        }
        breaker.record_trade_result(dec!(5), now);
        assert_eq!(breaker.consecutive_losses(), 0);

        breaker.record_trade_result(dec!(-10), now);
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[test]
    fn test_cooldown_enters_half_open_not_closed() {
        let mut breaker = make_breaker();
        let t0 = Utc::now();
        breaker.record_snapshot(dec!(0.20), dec!(0), dec!(10000), t0);
        assert!(!breaker.check(t0));

        // Just before the cooldown expires: still open
        let almost = t0 + Duration::seconds(3599);
        assert!(!breaker.check(almost));
        assert_eq!(breaker.state(), BreakerState::Open);

        // After the cooldown: half-open, trading permitted on probation
        let after = t0 + Duration::seconds(3600);
        assert!(breaker.check(after));
        assert_eq!(breaker.state(), BreakerState::HalfOpen);
    }

    #[test]
    fn test_half_open_closes_after_recovery_trades() {
        let mut breaker = make_breaker();
        let t0 = Utc::now();
        breaker.record_snapshot(dec!(0.20), dec!(0), dec!(10000), t0);
        let after = t0 + Duration::seconds(3601);
        breaker.check(after);
        assert_eq!(breaker.state(), BreakerState::HalfOpen);

        breaker.record_trade_result(dec!(5), after);
        breaker.record_trade_result(dec!(0), after); // break-even counts as non-losing
        assert_eq!(breaker.state(), BreakerState::HalfOpen);
        breaker.record_trade_result(dec!(3), after);
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[test]
    fn test_half_open_reopens_on_drawdown() {
        let mut breaker = make_breaker();
        let t0 = Utc::now();
        breaker.record_snapshot(dec!(0.20), dec!(0), dec!(10000), t0);
        let after = t0 + Duration::seconds(3601);
        breaker.check(after);
        assert_eq!(breaker.state(), BreakerState::HalfOpen);

        breaker.record_snapshot(dec!(0.18), dec!(0), dec!(10000), after);
        assert_eq!(breaker.state(), BreakerState::Open);
        // A fresh cooldown starts from the re-trip
        assert_eq!(breaker.state_entered_at(), after);
    }

    #[test]
    fn test_half_open_loss_resets_probation() {
        let mut breaker = CircuitBreaker::new(
            BreakerConfig {
                recovery_trades: 2,
                ..BreakerConfig::default()
            },
            dec!(0.05),
        );
        let t0 = Utc::now();
        breaker.record_snapshot(dec!(0.20), dec!(0), dec!(10000), t0);
        let after = t0 + Duration::seconds(3601);
        breaker.check(after);

        breaker.record_trade_result(dec!(5), after);
        breaker.record_trade_result(dec!(-1), after); // probation progress lost
        breaker.record_trade_result(dec!(5), after);
        assert_eq!(breaker.state(), BreakerState::HalfOpen);
        breaker.record_trade_result(dec!(5), after);
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[test]
    fn test_snapshot_ignored_while_open() {
        let mut breaker = make_breaker();
        let t0 = Utc::now();
        breaker.record_snapshot(dec!(0.20), dec!(0), dec!(10000), t0);
        let entered = breaker.state_entered_at();

        // Further breaches while open must not restart the cooldown
        breaker.record_snapshot(dec!(0.30), dec!(0), dec!(10000), t0 + Duration::seconds(100));
        assert_eq!(breaker.state_entered_at(), entered);
    }
}
