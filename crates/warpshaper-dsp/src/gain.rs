use crate::lattice::lattice_step;

/// Input and output scale factors of the warped lattice.
///
/// `s1` is pinned to unity and `s2` is chosen so that `x = y + u` holds with
/// a unit coefficient on `y`, which is what error feedback requires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DerivedGains {
    pub s1: f32,
    pub s2: f32,
}

impl Default for DerivedGains {
    fn default() -> Self {
        Self::unity()
    }
}

impl DerivedGains {
    #[inline]
    pub const fn unity() -> Self {
        Self { s1: 1.0, s2: 1.0 }
    }

    /// Derives the scale factors for `lambda` and the active reflection
    /// coefficients. The recursion accumulates in `f64`.
    pub fn compute(lambda: f32, coefficients: &[f32]) -> Self {
        let negative_lambda = -f64::from(lambda);
        let mut a = 1.0f64;
        let mut b = 1.0f64;
        for &k in coefficients {
            b *= negative_lambda;
            lattice_step(&mut a, &mut b, k);
        }
        Self {
            s1: 1.0,
            s2: (1.0 / a) as f32,
        }
    }

    /// Gain of the shaped error relative to the unfiltered error at DC.
    #[inline]
    pub fn warp_gain(&self) -> f32 {
        (1.0 / f64::from(self.s1) / f64::from(self.s2)) as f32
    }
}
