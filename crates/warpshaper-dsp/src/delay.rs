//! Warped unit delay.
//!
//! The lattice replaces every `z^-1` with a first-order allpass
//!
//! ```text
//! o[n]   = (1 - lambda^2) * t[n] - lambda * i[n]
//! t[n+1] = i[n] + lambda * t[n]
//! ```
//!
//! The state `t` is stored in single precision while the signal running
//! through the lattice stays in `f64`.

/// Runs the allpass on `io` in place and commits the new state to `t`.
#[inline(always)]
pub fn advance(io: &mut f64, t: &mut f32, lambda: f32) {
    let next = (*io + f64::from(lambda * *t)) as f32;
    *io = f64::from(*t - lambda * next);
    *t = next;
}

/// Same transfer as [`advance`], evaluated against `t` without storing the
/// successor state.
#[inline(always)]
pub fn forecast(io: &mut f64, t: f32, lambda: f32) {
    let next = (*io + f64::from(lambda * t)) as f32;
    *io = f64::from(t - lambda * next);
}

/// Standalone warped delay owning its state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WarpedDelay {
    lambda: f32,
    state: f32,
}

impl WarpedDelay {
    #[inline]
    pub fn new(lambda: f32) -> Self {
        Self { lambda, state: 0.0 }
    }

    #[inline]
    pub fn lambda(&self) -> f32 {
        self.lambda
    }

    #[inline]
    pub fn state(&self) -> f32 {
        self.state
    }

    #[inline]
    pub fn reset(&mut self) {
        self.state = 0.0;
    }

    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let mut io = input;
        advance(&mut io, &mut self.state, self.lambda);
        io
    }

    /// Output the delay would produce for `input` without moving its state.
    #[inline]
    pub fn peek(&self, input: f64) -> f64 {
        let mut io = input;
        forecast(&mut io, self.state, self.lambda);
        io
    }
}
