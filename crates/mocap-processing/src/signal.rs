//! Butterworth low-pass design and zero-phase filtering.
//!
//! The design follows the classic digital recipe: analog prototype poles,
//! frequency pre-warping, bilinear transform, then expansion into
//! transfer-function coefficients. Filtering runs the difference equation
//! forwards and backwards over an odd-extended copy of the signal, with
//! steady-state initial conditions, so the output has no phase lag.

use num_complex::Complex;
use std::f64::consts::PI;

/// Transfer-function coefficients of a digital filter.
///
/// `b` is the feed-forward (numerator) sequence and `a` the feedback
/// (denominator) sequence, normalized so that `a[0] == 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCoefficients {
    pub b: Vec<f64>,
    pub a: Vec<f64>,
}

impl FilterCoefficients {
    /// Number of taps, the longer of the two sequences.
    pub fn taps(&self) -> usize {
        self.a.len().max(self.b.len())
    }

    /// Samples needed per column for forward-backward filtering.
    pub fn min_samples(&self) -> usize {
        3 * self.taps()
    }
}

/// Design a low-pass Butterworth filter.
///
/// `normalized_cutoff` is the cutoff divided by the Nyquist frequency and
/// must lie in `(0, 1)`; `order` must be at least 1. Callers validate both.
pub fn butterworth_lowpass(order: usize, normalized_cutoff: f64) -> FilterCoefficients {
    let n = order as f64;

    // Pre-warp for the bilinear transform with fs = 2.
    let warped = 4.0 * (PI * normalized_cutoff / 2.0).tan();

    let poles: Vec<Complex<f64>> = (0..order)
        .map(|k| {
            let m = 2.0 * k as f64 - n + 1.0;
            let prototype = -Complex::from_polar(1.0, PI * m / (2.0 * n));
            prototype * warped
        })
        .collect();

    let fs2 = Complex::new(4.0, 0.0);
    let denominator: Complex<f64> = poles.iter().map(|p| fs2 - p).product();
    let gain = (Complex::new(warped.powi(order as i32), 0.0) / denominator).re;

    let digital_poles: Vec<Complex<f64>> = poles.iter().map(|p| (fs2 + p) / (fs2 - p)).collect();

    // All zeros sit at z = -1, so the numerator is a row of binomials.
    let b = binomial_row(order).into_iter().map(|c| c * gain).collect();
    let a = poly_from_roots(&digital_poles)
        .into_iter()
        .map(|c| c.re)
        .collect();

    FilterCoefficients { b, a }
}

fn binomial_row(order: usize) -> Vec<f64> {
    let mut row = vec![1.0];
    for _ in 0..order {
        let mut next = vec![1.0; row.len() + 1];
        for j in 1..row.len() {
            next[j] = row[j - 1] + row[j];
        }
        row = next;
    }
    row
}

fn poly_from_roots(roots: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let mut coeffs = vec![Complex::new(1.0, 0.0)];
    for root in roots {
        coeffs.push(Complex::new(0.0, 0.0));
        for j in (1..coeffs.len()).rev() {
            let previous = coeffs[j - 1];
            coeffs[j] -= root * previous;
        }
    }
    coeffs
}

/// Steady-state initial conditions for a unit step input.
///
/// Scaled by the first sample of a pass, these start the filter as if the
/// signal had been constant forever, removing the start-up transient.
pub fn lfilter_zi(coeffs: &FilterCoefficients) -> Vec<f64> {
    let (b, a) = padded(coeffs);
    let n = a.len();
    let mut zi = vec![0.0; n - 1];
    if zi.is_empty() {
        return zi;
    }

    let a_sum: f64 = a.iter().sum();
    let b_sum: f64 = (1..n).map(|k| b[k] - a[k] * b[0]).sum();
    zi[0] = b_sum / a_sum;

    let mut asum = 1.0;
    let mut csum = 0.0;
    for k in 1..n - 1 {
        asum += a[k];
        csum += b[k] - a[k] * b[0];
        zi[k] = asum * zi[0] - csum;
    }
    zi
}

/// Run the difference equation (direct form II transposed) over `input`.
pub fn lfilter(coeffs: &FilterCoefficients, input: &[f64], initial: &[f64]) -> Vec<f64> {
    let (b, a) = padded(coeffs);
    let mut state = initial.to_vec();
    let order = state.len();

    input
        .iter()
        .map(|&x| {
            let y = b[0] * x + state.first().copied().unwrap_or(0.0);
            for i in 0..order {
                let carried = if i + 1 < order { state[i + 1] } else { 0.0 };
                state[i] = b[i + 1] * x + carried - a[i + 1] * y;
            }
            y
        })
        .collect()
}

/// Zero-phase forward-backward filtering.
///
/// Returns `None` when the signal is shorter than
/// [`FilterCoefficients::min_samples`]. The signal is extended at both ends by
/// point reflection through its end samples (`padlen = 3 * taps`, clamped to
/// `len - 1` for signals of exactly the minimum length).
pub fn filtfilt(coeffs: &FilterCoefficients, signal: &[f64]) -> Option<Vec<f64>> {
    let len = signal.len();
    if len < coeffs.min_samples() || len < 2 {
        return None;
    }
    let edge = coeffs.min_samples().min(len - 1);

    let extended = odd_extend(signal, edge);
    let zi = lfilter_zi(coeffs);

    let start: Vec<f64> = zi.iter().map(|z| z * extended[0]).collect();
    let mut forward = lfilter(coeffs, &extended, &start);

    forward.reverse();
    let start: Vec<f64> = zi.iter().map(|z| z * forward[0]).collect();
    let mut backward = lfilter(coeffs, &forward, &start);
    backward.reverse();

    Some(backward[edge..edge + len].to_vec())
}

fn odd_extend(signal: &[f64], edge: usize) -> Vec<f64> {
    let len = signal.len();
    let first = signal[0];
    let last = signal[len - 1];

    let mut extended = Vec::with_capacity(len + 2 * edge);
    extended.extend((1..=edge).rev().map(|i| 2.0 * first - signal[i]));
    extended.extend_from_slice(signal);
    extended.extend((len - 1 - edge..len - 1).rev().map(|i| 2.0 * last - signal[i]));
    extended
}

// Both sequences padded to the same length so the recurrences can index freely.
fn padded(coeffs: &FilterCoefficients) -> (Vec<f64>, Vec<f64>) {
    let taps = coeffs.taps();
    let a0 = coeffs.a.first().copied().unwrap_or(1.0);
    let mut b: Vec<f64> = coeffs.b.iter().map(|v| v / a0).collect();
    let mut a: Vec<f64> = coeffs.a.iter().map(|v| v / a0).collect();
    b.resize(taps, 0.0);
    a.resize(taps, 0.0);
    (b, a)
}
