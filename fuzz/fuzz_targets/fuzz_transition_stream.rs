//! Fuzz target for streaming feature extraction and test-then-train.
//!
//! Feeds arbitrary labeled batches through a transition model and checks
//! that it never panics and that its counters stay consistent.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ss_common::Frame;
use ss_core::classifier::GaussianNaiveBayes;
use ss_core::TransitionModel;

#[derive(Debug, Arbitrary)]
struct Batch {
    values: Vec<(f64, u8)>,
}

#[derive(Debug, Arbitrary)]
struct Input {
    window: u8,
    batches: Vec<Batch>,
}

fuzz_target!(|input: Input| {
    let window = usize::from(input.window % 8) + 2;
    let Ok(mut model) =
        TransitionModel::new(vec!["x"], window, Box::new(GaussianNaiveBayes::new()))
    else {
        return;
    };

    let mut clock = 0i64;
    for batch in input.batches.iter().take(16) {
        let rows: Vec<Vec<f64>> = batch.values.iter().map(|(v, _)| vec![*v]).collect();
        let labels: Vec<usize> = batch.values.iter().map(|(_, l)| usize::from(*l % 4)).collect();
        let timestamps: Vec<i64> = (0..rows.len() as i64).map(|i| clock + i).collect();
        clock += rows.len() as i64;

        let Ok(frame) = Frame::new(vec!["x"], rows)
            .and_then(|f| f.with_timestamps(timestamps))
            .and_then(|f| f.with_labels(labels))
        else {
            continue;
        };

        let before = model.predictions();
        if let Ok(report) = model.partial_fit(&frame) {
            assert_eq!(model.predictions(), before + report.rows as u64);
        }
        assert!(model.history_len() <= window);
    }
});
