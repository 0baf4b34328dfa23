//! Error-feedback quantizer driven by a [`WarpedLatticeShaper`].
//!
//! Per sample `s`:
//!
//! ```text
//! w = s - u
//! q = round(w + dither)
//! x = clamp(q - w, -threshold, threshold)
//! shaper.advance(x)
//! ```
//!
//! The clip threshold keeps a saturating quantizer from pumping huge errors
//! into the lattice.

use crate::dither::Dither;
use crate::shaper::WarpedLatticeShaper;

#[derive(Clone, Debug)]
pub struct ShapedQuantizer {
    shaper: WarpedLatticeShaper,
    dither: Dither,
    step: f32,
    clip_threshold: Option<f32>,
}

impl ShapedQuantizer {
    /// Quantizer with a step of 1.0, no dither and no error clipping.
    pub fn new(shaper: WarpedLatticeShaper) -> Self {
        Self {
            shaper,
            dither: Dither::none(),
            step: 1.0,
            clip_threshold: None,
        }
    }

    pub fn with_dither(mut self, dither: Dither) -> Self {
        self.dither = dither;
        self
    }

    /// Quantization step in signal units, e.g. `2.0 / 65536.0` for 16 bit
    /// output of a [-1, 1] signal. The sign is ignored. A zero, subnormal,
    /// NaN or infinite step is rejected and the current step is kept.
    pub fn with_step(mut self, step: f32) -> Self {
        let step = step.abs();
        if step.is_normal() {
            self.step = step;
        } else {
            tracing::warn!(step, kept = self.step, "ignoring unusable quantizer step");
        }
        self
    }

    /// Limits the fed-back error to `threshold` steps. A NaN or infinite
    /// threshold disables clipping.
    pub fn with_clip_threshold(mut self, threshold: f32) -> Self {
        self.clip_threshold = if threshold.is_finite() {
            Some(threshold.abs())
        } else {
            tracing::warn!(threshold, "clip threshold is not finite, clipping disabled");
            None
        };
        self
    }

    #[inline]
    pub fn clip_threshold(&self) -> Option<f32> {
        self.clip_threshold
    }

    #[inline]
    pub fn step(&self) -> f32 {
        self.step
    }

    #[inline]
    pub fn shaper(&self) -> &WarpedLatticeShaper {
        &self.shaper
    }

    #[inline]
    pub fn shaper_mut(&mut self) -> &mut WarpedLatticeShaper {
        &mut self.shaper
    }

    /// Quantizes one sample and returns it in signal units.
    #[inline]
    pub fn process_sample(&mut self, sample: f32) -> f32 {
        let w = sample / self.step - self.shaper.next_excitation();
        let q = (w + self.dither.sample()).round();
        let mut x = q - w;
        if let Some(threshold) = self.clip_threshold {
            x = x.clamp(-threshold, threshold);
        }
        self.shaper.advance(x);
        q * self.step
    }

    /// Quantizes `input` into `output` and returns the number of samples
    /// written.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) -> usize {
        let frames = input.len().min(output.len());
        for (out, &sample) in output[..frames].iter_mut().zip(&input[..frames]) {
            *out = self.process_sample(sample);
        }
        frames
    }

    pub fn process_in_place(&mut self, samples: &mut [f32]) {
        for sample in samples {
            *sample = self.process_sample(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.shaper.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dither::DitherKind;

    fn shaper() -> WarpedLatticeShaper {
        let mut shaper = WarpedLatticeShaper::new();
        shaper.configure(0.5, 2, &[0.25, -0.15]);
        shaper
    }

    #[test]
    fn bypass_rounds_plainly() {
        let mut quantizer = ShapedQuantizer::new(WarpedLatticeShaper::new());
        let input = [0.2f32, 0.6, -1.4, 2.5, -0.49];
        let mut output = [0.0f32; 5];
        assert_eq!(quantizer.process(&input, &mut output), 5);
        let expected: Vec<f32> = input.iter().map(|s| s.round()).collect();
        assert_eq!(output.to_vec(), expected);
    }

    #[test]
    fn total_error_is_shaped_error() {
        // q - s = x - u, with u read before the sample is processed.
        let mut quantizer = ShapedQuantizer::new(shaper());
        for n in 0..64 {
            let s = (n as f32 * 0.37).sin() * 5.3;
            let u = quantizer.shaper().next_excitation();
            let w = s - u;
            let q = quantizer.process_sample(s);
            let x = q - w;
            assert!(((q - s) - (x - u)).abs() < 1e-5);
            assert!(x.abs() <= 0.5 + 1e-5);
        }
    }

    #[test]
    fn dithered_clipped_runs_repeat() {
        let reference = {
            let mut quantizer = ShapedQuantizer::new(shaper())
                .with_dither(Dither::new(DitherKind::Tpdf, 9))
                .with_clip_threshold(0.25);
            let input: Vec<f32> = (0..256).map(|n| (n as f32 * 0.05).sin() * 3.0).collect();
            let mut output = vec![0.0; input.len()];
            quantizer.process(&input, &mut output);
            output
        };
        let mut again = ShapedQuantizer::new(shaper())
            .with_dither(Dither::new(DitherKind::Tpdf, 9))
            .with_clip_threshold(0.25);
        let mut samples: Vec<f32> = (0..256).map(|n| (n as f32 * 0.05).sin() * 3.0).collect();
        again.process_in_place(&mut samples);
        assert_eq!(samples, reference);
    }

    #[test]
    fn step_scales_output_grid() {
        let step = 1.0 / 128.0;
        let mut quantizer = ShapedQuantizer::new(shaper()).with_step(step);
        for n in 0..100 {
            let q = quantizer.process_sample((n as f32 * 0.11).cos() * 0.8);
            let steps = q / step;
            assert!((steps - steps.round()).abs() < 1e-3);
        }
    }

    #[test]
    fn unusable_step_keeps_previous() {
        let quantizer = ShapedQuantizer::new(shaper()).with_step(-0.25);
        assert_eq!(quantizer.step(), 0.25);
        for step in [0.0, f32::NAN, f32::INFINITY, f32::MIN_POSITIVE / 4.0] {
            assert_eq!(quantizer.clone().with_step(step).step(), 0.25);
        }
        let mut quantizer = ShapedQuantizer::new(shaper()).with_step(0.0);
        assert_eq!(quantizer.step(), 1.0);
        assert_eq!(quantizer.process_sample(2.2), 2.0);
    }

    #[test]
    fn nan_clip_threshold_disables_clipping() {
        let mut clipped = ShapedQuantizer::new(shaper()).with_clip_threshold(f32::NAN);
        assert_eq!(clipped.clip_threshold(), None);
        let mut reference = ShapedQuantizer::new(shaper());
        for n in 0..64 {
            let s = (n as f32 * 0.21).sin() * 4.0;
            assert_eq!(clipped.process_sample(s), reference.process_sample(s));
        }
        let open = ShapedQuantizer::new(shaper()).with_clip_threshold(f32::INFINITY);
        assert_eq!(open.clip_threshold(), None);
        let tight = ShapedQuantizer::new(shaper()).with_clip_threshold(-0.3);
        assert_eq!(tight.clip_threshold(), Some(0.3));
    }

    #[test]
    fn reset_restarts_shaper() {
        let mut quantizer = ShapedQuantizer::new(shaper());
        quantizer.process_sample(0.4);
        assert_ne!(quantizer.shaper().next_excitation(), 0.0);
        quantizer.reset();
        assert_eq!(quantizer.shaper().next_excitation(), 0.0);
    }
}
