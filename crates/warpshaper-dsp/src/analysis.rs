//! Offline inspection of a configured shaper.

use std::f64::consts::PI;

use crate::shaper::WarpedLatticeShaper;

/// Runs a unit impulse through `shaper` and records the shaped error
/// `y = x - u` for `len` samples. The shaper state advances.
pub fn impulse_response(shaper: &mut WarpedLatticeShaper, len: usize) -> Vec<f32> {
    (0..len)
        .map(|n| {
            let x = if n == 0 { 1.0 } else { 0.0 };
            let y = x - shaper.next_excitation();
            shaper.advance(x);
            y
        })
        .collect()
}

/// Converts a linear magnitude to decibels, flooring silence at -240 dB.
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    if linear <= 1e-12 {
        -240.0
    } else {
        20.0 * linear.log10()
    }
}

/// One point of a magnitude response.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResponsePoint {
    /// Frequency in cycles per sample, 0 to 0.5.
    pub frequency: f64,
    pub magnitude_db: f64,
}

/// Magnitude of the DFT of `response` on `bins` evenly spaced frequencies
/// from DC to Nyquist inclusive.
pub fn magnitude_response_db(response: &[f32], bins: usize) -> Vec<ResponsePoint> {
    let last = bins.saturating_sub(1).max(1) as f64;
    (0..bins)
        .map(|bin| {
            let frequency = 0.5 * bin as f64 / last;
            let omega = 2.0 * PI * frequency;
            let (mut re, mut im) = (0.0f64, 0.0f64);
            for (n, &h) in response.iter().enumerate() {
                let phase = omega * n as f64;
                re += f64::from(h) * phase.cos();
                im -= f64::from(h) * phase.sin();
            }
            ResponsePoint {
                frequency,
                magnitude_db: linear_to_db(re.hypot(im)),
            }
        })
        .collect()
}
