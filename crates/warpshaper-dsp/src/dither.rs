use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Dither distribution, in units of one quantization step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DitherKind {
    #[default]
    None,
    /// Uniform over [-0.5, 0.5).
    Rectangular,
    /// Triangular over (-1, 1).
    Tpdf,
}

/// Seeded dither source. Equal seeds give equal sequences.
#[derive(Clone, Debug)]
pub struct Dither {
    kind: DitherKind,
    rng: StdRng,
}

impl Dither {
    pub fn new(kind: DitherKind, seed: u64) -> Self {
        Self {
            kind,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn none() -> Self {
        Self::new(DitherKind::None, 0)
    }

    #[inline]
    pub fn kind(&self) -> DitherKind {
        self.kind
    }

    #[inline]
    pub fn sample(&mut self) -> f32 {
        match self.kind {
            DitherKind::None => 0.0,
            DitherKind::Rectangular => self.rng.gen::<f32>() - 0.5,
            DitherKind::Tpdf => {
                let a: f32 = self.rng.gen();
                let b: f32 = self.rng.gen();
                a - b
            }
        }
    }
}
