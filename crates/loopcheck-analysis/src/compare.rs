//! Sample-level comparison of an original and a recorded signal

/// Mean squared error over the common prefix of two signals
///
/// Returns 0 when either signal is empty.
pub fn mse(signal_a: &[f64], signal_b: &[f64]) -> f64 {
    let len = signal_a.len().min(signal_b.len());
    if len == 0 {
        return 0.0;
    }

    let sum: f64 = signal_a
        .iter()
        .zip(signal_b.iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum();

    sum / len as f64
}

/// Shift two signals into alignment and cut them to a common length
///
/// A positive `lag` drops that many leading samples of `original`; zero or
/// negative drops `|lag|` leading samples of `recorded`. Both remainders are
/// then truncated to the shorter of the two. A lag longer than the signal
/// leaves an empty overlap.
pub fn align_and_truncate<'a, T>(
    original: &'a [T],
    recorded: &'a [T],
    lag: i64,
) -> (&'a [T], &'a [T]) {
    let shift = lag.unsigned_abs() as usize;
    let (original, recorded) = if lag > 0 {
        (original.get(shift..).unwrap_or(&[]), recorded)
    } else {
        (original, recorded.get(shift..).unwrap_or(&[]))
    };
    let len = original.len().min(recorded.len());
    (&original[..len], &recorded[..len])
}
