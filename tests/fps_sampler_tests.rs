use lumen::kernel::fps::{self, FpsSampler};
use lumen::kernel::history::MemoryHistory;
use lumen::kernel::time::Timestamp;
use proptest::prelude::*;

fn feed(sampler: &mut FpsSampler, start: f64, step: f64, frames: u32) -> Vec<u32> {
    (1..=frames)
        .filter_map(|k| sampler.on_tick(Timestamp::from_millis(start + step * k as f64)))
        .collect()
}

#[test]
fn test_no_sample_before_full_window() {
    let mut sampler = FpsSampler::new(Timestamp::from_millis(0.0));

    // 49 frames at 20ms only reach 980ms.
    let samples = feed(&mut sampler, 0.0, 20.0, 49);
    assert!(samples.is_empty());
    assert_eq!(sampler.pending_frames(), 49);
}

#[test]
fn test_window_closes_and_resets() {
    let mut sampler = FpsSampler::new(Timestamp::from_millis(0.0));

    let samples = feed(&mut sampler, 0.0, 20.0, 50);
    assert_eq!(samples, vec![50]);
    assert_eq!(sampler.pending_frames(), 0);

    // Next window starts at the closing frame.
    let samples = feed(&mut sampler, 1000.0, 40.0, 25);
    assert_eq!(samples, vec![25]);
}

#[test]
fn test_late_frame_rounds_over_elapsed() {
    let mut sampler = FpsSampler::new(Timestamp::from_millis(0.0));

    for k in 1..30 {
        assert_eq!(sampler.on_tick(Timestamp::from_millis(k as f64 * 30.0)), None);
    }
    // 30 frames over 1200ms -> 25 FPS.
    assert_eq!(sampler.on_tick(Timestamp::from_millis(1200.0)), Some(25));
}

#[test]
fn test_reset_discards_partial_window() {
    let mut sampler = FpsSampler::new(Timestamp::from_millis(0.0));
    feed(&mut sampler, 0.0, 10.0, 60);

    sampler.reset(Timestamp::from_millis(5000.0));
    assert_eq!(sampler.pending_frames(), 0);
    assert_eq!(feed(&mut sampler, 5000.0, 10.0, 100), vec![100]);
}

#[test]
fn test_stability_scores() {
    assert_eq!(fps::stability(&[]), 100.0);
    assert_eq!(fps::stability(&[42]), 100.0);
    assert_eq!(fps::stability(&[60, 60, 60]), 100.0);

    // mean 60, population sd 10
    let score = fps::stability(&[50, 70]);
    assert!((score - (100.0 - 10.0 / 60.0 * 100.0)).abs() < 1e-9);

    // Extreme spread floors at zero.
    assert_eq!(fps::stability(&[0, 0, 0, 100]), 0.0);
}

#[test]
fn test_mean_and_std_dev() {
    assert_eq!(fps::mean(&[]), 0.0);
    assert_eq!(fps::mean(&[30, 60]), 45.0);
    assert_eq!(fps::std_dev(&[30, 60]), 15.0);
}

#[test]
fn test_history_evicts_oldest() {
    let mut history = MemoryHistory::new(3);
    assert!(history.is_empty());

    assert_eq!(history.push(1), None);
    history.push(2);
    history.push(3);
    assert_eq!(history.push(4), Some(1));

    assert_eq!(history.len(), 3);
    assert_eq!(history.to_vec(), vec![2, 3, 4]);

    history.clear();
    assert!(history.is_empty());
    assert_eq!(history.capacity(), 3);
}

#[test]
fn test_history_windows_need_both_full() {
    let mut history = MemoryHistory::new(100);
    for v in 0..19 {
        history.push(v);
    }
    assert!(history.windows(10).is_none());

    history.push(19);
    let (recent, older) = history.windows(10).unwrap();
    assert_eq!(older, (0..10).collect::<Vec<u64>>());
    assert_eq!(recent, (10..20).collect::<Vec<u64>>());
}

const EXACT_RATES: [u32; 9] = [10, 20, 25, 40, 50, 100, 125, 200, 250];

proptest! {
    #[test]
    fn prop_exact_rate_yields_one_sample_per_second(
        rate_idx in 0usize..EXACT_RATES.len(),
        seconds in 1u32..30,
        start in 0u32..100_000,
    ) {
        let rate = EXACT_RATES[rate_idx];
        let step = 1000.0 / rate as f64;
        let start = start as f64;
        let mut sampler = FpsSampler::new(Timestamp::from_millis(start));

        let samples = feed(&mut sampler, start, step, rate * seconds);

        prop_assert_eq!(samples.len(), seconds as usize);
        prop_assert!(samples.iter().all(|&s| s == rate));
    }

    #[test]
    fn prop_history_never_exceeds_capacity(
        capacity in 1usize..50,
        values in proptest::collection::vec(any::<u64>(), 0..200),
    ) {
        let mut history = MemoryHistory::new(capacity);
        for &v in &values {
            history.push(v);
        }

        prop_assert!(history.len() <= capacity);
        let kept = values.len().min(capacity);
        prop_assert_eq!(history.to_vec(), values[values.len() - kept..].to_vec());
    }

    #[test]
    fn prop_stability_in_range(samples in proptest::collection::vec(0u32..240, 0..60)) {
        let score = fps::stability(&samples);
        prop_assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn prop_stability_falls_as_spread_grows(
        mean in 50u32..200,
        a in 0u32..50,
        b in 0u32..50,
    ) {
        let (narrow, wide) = if a <= b { (a, b) } else { (b, a) };
        let spread = |d: u32| fps::stability(&[mean - d, mean + d, mean - d, mean + d]);

        prop_assert!(spread(narrow) >= spread(wide));
        if narrow < wide {
            prop_assert!(spread(narrow) > spread(wide));
        }
    }
}
