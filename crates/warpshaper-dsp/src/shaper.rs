//! Frequency-warped all-pole lattice noise shaper.
//!
//! ```text
//!    y ---|>--*---------*->(+)------*->(+)-- ... -------->(+)--|>--- x
//!         s1   \         \ /         \ /                  /    s2
//!               \     -k1 X       -k2 X              -kn /
//!                \       / \         / \                /
//!                 --[D]-*->(+)--[D]-*->(+)-- ... --[D]--
//! ```
//!
//! `D` is the warped delay from [`crate::delay`]. The structure above maps the
//! shaped error `y` to the raw quantization error `x`; the shaper runs it in
//! reverse by subtracting the predicted part `u` so that `x = y + u`.
//!
//! Typical use, with one quantization step scaled to 1.0:
//!
//! ```
//! use warpshaper_dsp::WarpedLatticeShaper;
//!
//! let mut shaper = WarpedLatticeShaper::new();
//! shaper.configure(0.5, 2, &[0.25, -0.15]);
//! for s in [0.3f32, 1.7, -0.4] {
//!     let w = s - shaper.next_excitation();
//!     let q = w.round();
//!     shaper.advance(q - w);
//! }
//! ```

use std::fmt;

use crate::config::{ConfigError, ShaperConfig};
use crate::delay;
use crate::gain::DerivedGains;
use crate::lattice::lattice_step;
use crate::MAX_ORDER;

#[derive(Clone)]
pub struct WarpedLatticeShaper {
    config: ShaperConfig,
    gains: DerivedGains,
    t: [f32; MAX_ORDER],
    next_u: f32,
}

impl Default for WarpedLatticeShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl WarpedLatticeShaper {
    /// Neutral shaper: order 0, unity gains, silent state.
    pub const fn new() -> Self {
        Self {
            config: ShaperConfig::bypass(),
            gains: DerivedGains::unity(),
            t: [0.0; MAX_ORDER],
            next_u: 0.0,
        }
    }

    pub fn with_config(config: ShaperConfig) -> Self {
        let mut shaper = Self::new();
        shaper.apply_config(config);
        shaper
    }

    /// Sets lambda and the first `order` reflection coefficients. Orders above
    /// [`MAX_ORDER`] are clamped.
    ///
    /// # Panics
    ///
    /// Panics if `coefficients` is shorter than the clamped order.
    pub fn configure(&mut self, lambda: f32, order: usize, coefficients: &[f32]) {
        self.apply_config(ShaperConfig::with_order(lambda, order, coefficients));
    }

    /// Like [`configure`](Self::configure) but pulls the coefficients from any
    /// iterator, consuming at most the clamped order.
    pub fn configure_from_iter<I>(&mut self, lambda: f32, order: usize, coefficients: I)
    where
        I: IntoIterator<Item = f32>,
    {
        self.apply_config(ShaperConfig::from_source(lambda, order, coefficients));
    }

    /// Strict form of [`configure`](Self::configure). On error the shaper is
    /// left untouched.
    pub fn try_configure(
        &mut self,
        lambda: f32,
        order: usize,
        coefficients: &[f32],
    ) -> Result<(), ConfigError> {
        let config = ShaperConfig::try_new(lambda, order, coefficients)?;
        self.apply_config(config);
        Ok(())
    }

    /// Installs `config`. Stages that were already active keep their state so
    /// coefficients can change while running; stages that become active start
    /// from zero. The excitation is refreshed before returning.
    pub fn apply_config(&mut self, config: ShaperConfig) {
        let old_order = self.config.order();
        let new_order = config.order();
        if new_order > old_order {
            self.t[old_order..new_order].fill(0.0);
        }
        self.gains = DerivedGains::compute(config.lambda(), config.coefficients());
        self.config = config;
        self.next_u = self.forecast_excitation();
    }

    #[inline]
    pub fn config(&self) -> &ShaperConfig {
        &self.config
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.config.order()
    }

    #[inline]
    pub fn lambda(&self) -> f32 {
        self.config.lambda()
    }

    /// # Panics
    ///
    /// Panics if `index >= self.order()`.
    #[inline]
    pub fn coefficient(&self, index: usize) -> f32 {
        self.config.coefficient(index)
    }

    #[inline]
    pub fn coefficients(&self) -> &[f32] {
        self.config.coefficients()
    }

    #[inline]
    pub fn gains(&self) -> DerivedGains {
        self.gains
    }

    #[inline]
    pub fn warp_gain(&self) -> f32 {
        self.gains.warp_gain()
    }

    /// Value to subtract from the next sample before quantizing it.
    #[inline]
    pub fn next_excitation(&self) -> f32 {
        self.next_u
    }

    /// Warped delay state of the active stages.
    #[inline]
    pub fn delay_state(&self) -> &[f32] {
        &self.t[..self.config.order()]
    }

    /// Feeds back the quantization error `x` of the sample just produced and
    /// prepares the excitation for the following one.
    ///
    /// Two lanes run through the stages: the real lane drives the delay state
    /// forward, the forecast lane starts from zero and sees each delay after it
    /// has been advanced. Only the forecast result is kept.
    #[inline]
    pub fn advance(&mut self, x: f32) {
        let y = f64::from(x) - f64::from(self.next_u);
        let mut a = y * f64::from(self.gains.s1);
        let mut b = a;
        let mut nua = 0.0f64;
        let mut nub = 0.0f64;
        let lambda = self.config.lambda();
        let order = self.config.order();
        for (&k, t) in self.config.coefficients().iter().zip(&mut self.t[..order]) {
            delay::advance(&mut b, t, lambda);
            delay::forecast(&mut nub, *t, lambda);
            lattice_step(&mut a, &mut b, k);
            lattice_step(&mut nua, &mut nub, k);
        }
        self.next_u = (nua * f64::from(self.gains.s2)) as f32;
    }

    /// Clears the delay state and the pending excitation. The configuration is
    /// kept.
    pub fn reset(&mut self) {
        let order = self.config.order();
        self.t[..order].fill(0.0);
        self.next_u = 0.0;
    }

    fn forecast_excitation(&self) -> f32 {
        let lambda = self.config.lambda();
        let mut nua = 0.0f64;
        let mut nub = 0.0f64;
        for (&k, &t) in self.config.coefficients().iter().zip(&self.t) {
            delay::forecast(&mut nub, t, lambda);
            lattice_step(&mut nua, &mut nub, k);
        }
        (nua * f64::from(self.gains.s2)) as f32
    }
}

impl fmt::Debug for WarpedLatticeShaper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarpedLatticeShaper")
            .field("order", &self.order())
            .field("lambda", &self.lambda())
            .field("k", &self.coefficients())
            .field("s1", &self.gains.s1)
            .field("s2", &self.gains.s2)
            .field("t", &self.delay_state())
            .field("next_u", &self.next_u)
            .finish()
    }
}
