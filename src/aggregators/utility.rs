/// Averages two integers, rounding a `.5` result away from zero.
///
/// Uses an `i128` intermediate so the sum never overflows.
pub fn rounded_mean(a: i64, b: i64) -> i64 {
    let sum = i128::from(a) + i128::from(b);
    let half = sum / 2 + sum % 2;
    // |half| <= max(|a|, |b|), so the narrowing always fits
    half as i64
}
