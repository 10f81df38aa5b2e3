//! Benchmarks for the decision hot path

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use edge_engine::config::{SignalConfig, SizingConfig};
use edge_engine::risk::PositionSizer;
use edge_engine::signal::{Prediction, SignalGenerator, Strength};
use rust_decimal_macros::dec;

fn benchmark_kelly_sizing(c: &mut Criterion) {
    let sizer = PositionSizer::new(SizingConfig::default());

    c.bench_function("kelly_size_strong", |b| {
        b.iter(|| {
            sizer.size(
                black_box(dec!(0.65)),
                black_box(dec!(0.45)),
                Strength::Strong,
                black_box(dec!(10000)),
            )
        })
    });
}

fn benchmark_signal_generation(c: &mut Criterion) {
    let generator = SignalGenerator::new(SignalConfig::default());
    let prediction = Prediction {
        id: uuid::Uuid::new_v4(),
        market_id: "mkt-bench".to_string(),
        probability: dec!(0.65),
        market_price: dec!(0.45),
        confidence: dec!(0.80),
        model_version: "v1".to_string(),
        timestamp: chrono::Utc::now(),
    };

    c.bench_function("signal_generate", |b| {
        b.iter(|| generator.generate(black_box(&prediction), black_box(Some(dec!(1000)))))
    });
}

criterion_group!(benches, benchmark_kelly_sizing, benchmark_signal_generation);
criterion_main!(benches);
