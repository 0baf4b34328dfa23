/// Two-port lattice butterfly with reflection coefficient `k`.
///
/// Maps `(a, b)` to `(a - b * k, b - a * k)`. Both outputs are formed from the
/// incoming pair, so the second line never sees the updated `a`.
#[inline(always)]
pub fn lattice_step(a: &mut f64, b: &mut f64, k: f32) {
    let k = f64::from(k);
    let ak = *a * k;
    *a -= *b * k;
    *b -= ak;
}

/// Pure form of [`lattice_step`].
#[inline]
pub fn butterfly(a: f64, b: f64, k: f32) -> (f64, f64) {
    let (mut a, mut b) = (a, b);
    lattice_step(&mut a, &mut b, k);
    (a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_use_original_inputs() {
        let (a, b) = butterfly(2.0, 3.0, 0.5);
        assert_eq!(a, 2.0 - 3.0 * 0.5);
        assert_eq!(b, 3.0 - 2.0 * 0.5);
    }

    #[test]
    fn zero_coefficient_is_transparent() {
        assert_eq!(butterfly(-1.25, 4.0, 0.0), (-1.25, 4.0));
    }

    #[test]
    fn in_place_matches_pure_form() {
        let mut a = 0.75;
        let mut b = -0.2;
        lattice_step(&mut a, &mut b, -0.15);
        assert_eq!((a, b), butterfly(0.75, -0.2, -0.15));
    }
}
