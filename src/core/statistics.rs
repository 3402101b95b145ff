//! Summary statistics over resolved array values.
//!
//! Statistics are a derived view. Values declared by a producer are never
//! trusted over a recomputation from the array itself.

use serde::{Deserialize, Serialize};

use crate::array::{NullValue, Values};
use crate::util::Scalar;

/// Relative tolerance used when comparing declared and computed moments.
const MOMENT_TOLERANCE: f64 = 1e-9;

/// Summary of the valid (non-null) values of an array.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayStatistics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_value_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Scalar>,
    /// Share of valid values equal to the mode, in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode_percentage: Option<f64>,
}

impl ArrayStatistics {
    /// Compute statistics over `values`, skipping nulls.
    ///
    /// Floats treat NaN as null, integers skip the explicit null value,
    /// booleans and strings have no null. Mean and median are only
    /// produced for numeric values; mode ties go to the smallest value.
    pub fn compute(values: &Values, null: &NullValue) -> Self {
        match values {
            Values::Boolean(v) => {
                let trues = v.iter().filter(|&&b| b).count();
                let falses = v.len() - trues;
                let mut s = Self::empty(v.len());
                if !v.is_empty() {
                    s.minimum = Some(Scalar::Boolean(falses == 0));
                    s.maximum = Some(Scalar::Boolean(trues > 0));
                    let (mode, n) = if trues > falses { (true, trues) } else { (false, falses) };
                    s.mode = Some(Scalar::Boolean(mode));
                    s.mode_percentage = Some(percentage(n, v.len()));
                }
                s
            }
            Values::Integer(v) => {
                let mut valid: Vec<i64> = match null {
                    NullValue::Integer(n) => v.iter().copied().filter(|x| x != n).collect(),
                    _ => v.clone(),
                };
                valid.sort_unstable();
                let as_f64: Vec<f64> = valid.iter().map(|&x| x as f64).collect();
                let mut s = Self::ordered(&valid, Scalar::Integer);
                s.mean = mean(&as_f64);
                s.median = median(&as_f64);
                s
            }
            Values::Float(v) => {
                let mut valid: Vec<f64> = v.iter().copied().filter(|x| !x.is_nan()).collect();
                valid.sort_unstable_by(f64::total_cmp);
                let mut s = Self::ordered(&valid, Scalar::Float);
                s.mean = mean(&valid);
                s.median = median(&valid);
                s
            }
            Values::String(v) => {
                let mut valid: Vec<&str> = v.iter().map(|s| s.as_str()).collect();
                valid.sort_unstable();
                Self::ordered(&valid, |x| Scalar::String(x.to_string()))
            }
        }
    }

    fn empty(valid: usize) -> Self {
        Self {
            valid_value_count: Some(valid),
            ..Self::default()
        }
    }

    /// Minimum, maximum and mode of already sorted values.
    fn ordered<T: PartialEq + Copy>(sorted: &[T], to_scalar: impl Fn(T) -> Scalar) -> Self {
        let mut s = Self::empty(sorted.len());
        if let (Some(&lo), Some(&hi)) = (sorted.first(), sorted.last()) {
            s.minimum = Some(to_scalar(lo));
            s.maximum = Some(to_scalar(hi));
        }
        if let Some((mode, n)) = mode(sorted) {
            s.mode = Some(to_scalar(mode));
            s.mode_percentage = Some(percentage(n, sorted.len()));
        }
        s
    }

    /// Check that every field present in `self` agrees with `computed`.
    pub fn agrees_with(&self, computed: &ArrayStatistics) -> bool {
        fn scalar_eq(declared: &Option<Scalar>, computed: &Option<Scalar>) -> bool {
            match (declared, computed) {
                (None, _) => true,
                (Some(d), Some(c)) => match (d.as_f64(), c.as_f64()) {
                    (Some(a), Some(b)) => close(a, b),
                    _ => d == c,
                },
                (Some(_), None) => false,
            }
        }
        fn float_eq(declared: Option<f64>, computed: Option<f64>) -> bool {
            match (declared, computed) {
                (None, _) => true,
                (Some(a), Some(b)) => close(a, b),
                (Some(_), None) => false,
            }
        }
        self.valid_value_count.map_or(true, |n| computed.valid_value_count == Some(n))
            && scalar_eq(&self.minimum, &computed.minimum)
            && scalar_eq(&self.maximum, &computed.maximum)
            && scalar_eq(&self.mode, &computed.mode)
            && float_eq(self.mean, computed.mean)
            && float_eq(self.median, computed.median)
            && float_eq(self.mode_percentage, computed.mode_percentage)
    }
}

fn close(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() <= MOMENT_TOLERANCE * a.abs().max(b.abs())
}

fn percentage(n: usize, total: usize) -> f64 {
    n as f64 * 100.0 / total as f64
}

fn mean(sorted: &[f64]) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    Some(sorted.iter().sum::<f64>() / sorted.len() as f64)
}

fn median(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

/// Most frequent value of a sorted slice; the first run wins ties.
fn mode<T: PartialEq + Copy>(sorted: &[T]) -> Option<(T, usize)> {
    let mut best: Option<(T, usize)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let run = sorted[i..].iter().take_while(|&&x| x == sorted[i]).count();
        if best.map_or(true, |(_, n)| run > n) {
            best = Some((sorted[i], run));
        }
        i += run;
    }
    best
}
