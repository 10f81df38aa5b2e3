//! Prometheus metrics

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Predictions accepted for processing
    PredictionsProcessed,
    /// Signals generated
    SignalsGenerated,
    /// Trades opened
    TradesOpened,
    /// Trades closed
    TradesClosed,
    /// Risk admission denials
    RiskDenials,
    /// Breaker trips into Open
    BreakerTrips,
    /// All breaker state transitions
    BreakerTransitions,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Current equity
    Equity,
    /// Unrealized P&L
    UnrealizedPnl,
    /// Realized P&L
    RealizedPnl,
    /// Open position count
    OpenPositions,
    /// Total exposure
    TotalExposure,
    /// Current drawdown percentage
    DrawdownPct,
    /// Daily P&L
    DailyPnl,
}

fn counter_name(metric: CounterMetric) -> &'static str {
    match metric {
        CounterMetric::PredictionsProcessed => "edge_engine_predictions_processed_total",
        CounterMetric::SignalsGenerated => "edge_engine_signals_generated_total",
        CounterMetric::TradesOpened => "edge_engine_trades_opened_total",
        CounterMetric::TradesClosed => "edge_engine_trades_closed_total",
        CounterMetric::RiskDenials => "edge_engine_risk_denials_total",
        CounterMetric::BreakerTrips => "edge_engine_breaker_trips_total",
        CounterMetric::BreakerTransitions => "edge_engine_breaker_transitions_total",
    }
}

fn gauge_name(metric: GaugeMetric) -> &'static str {
    match metric {
        GaugeMetric::Equity => "edge_engine_equity_usd",
        GaugeMetric::UnrealizedPnl => "edge_engine_unrealized_pnl_usd",
        GaugeMetric::RealizedPnl => "edge_engine_realized_pnl_usd",
        GaugeMetric::OpenPositions => "edge_engine_open_positions",
        GaugeMetric::TotalExposure => "edge_engine_total_exposure_usd",
        GaugeMetric::DrawdownPct => "edge_engine_drawdown_pct",
        GaugeMetric::DailyPnl => "edge_engine_daily_pnl_usd",
    }
}

/// Increment a counter
pub fn record_counter(metric: CounterMetric, value: u64) {
    metrics::counter!(counter_name(metric)).increment(value);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(gauge_name(metric)).set(value);
}
