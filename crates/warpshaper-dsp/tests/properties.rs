use proptest::prelude::*;
use warpshaper_dsp::{WarpedLatticeShaper, MAX_ORDER};

fn coefficients(len: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-0.9f32..0.9, len)
}

fn run(shaper: &mut WarpedLatticeShaper, input: &[f32]) -> Vec<f32> {
    input
        .iter()
        .map(|&x| {
            let u = shaper.next_excitation();
            shaper.advance(x);
            u
        })
        .collect()
}

#[test]
fn order_zero_stays_silent() {
    let mut shaper = WarpedLatticeShaper::new();
    shaper.configure(0.6, 0, &[]);
    assert_eq!(shaper.warp_gain(), 1.0);
    for n in 0..1_000 {
        shaper.advance((n as f32 * 0.3).sin() * 100.0);
        assert_eq!(shaper.next_excitation(), 0.0);
    }
}

proptest! {
    #[test]
    fn reset_replays_like_a_fresh_shaper(
        lambda in -0.8f32..0.8,
        k in coefficients(6),
        order in 0usize..=6,
        warmup in prop::collection::vec(-2.0f32..2.0, 0..64),
        input in prop::collection::vec(-2.0f32..2.0, 1..64),
    ) {
        let mut fresh = WarpedLatticeShaper::new();
        fresh.configure(lambda, order, &k);
        let expected = run(&mut fresh, &input);

        let mut used = WarpedLatticeShaper::new();
        used.configure(lambda, order, &k);
        run(&mut used, &warmup);
        used.reset();
        prop_assert_eq!(run(&mut used, &input), expected);
    }

    #[test]
    fn oversized_order_behaves_like_max_order(
        lambda in -0.8f32..0.8,
        k in coefficients(1_000),
        input in prop::collection::vec(-1.0f32..1.0, 1..32),
    ) {
        let mut clamped = WarpedLatticeShaper::new();
        clamped.configure(lambda, 1_000, &k);
        let mut exact = WarpedLatticeShaper::new();
        exact.configure(lambda, MAX_ORDER, &k[..MAX_ORDER]);

        prop_assert_eq!(clamped.order(), MAX_ORDER);
        prop_assert_eq!(clamped.coefficients(), exact.coefficients());
        prop_assert_eq!(clamped.warp_gain(), exact.warp_gain());
        prop_assert_eq!(run(&mut clamped, &input), run(&mut exact, &input));
    }

    #[test]
    fn excitation_after_configure_is_deterministic(
        lambda in -0.8f32..0.8,
        k in coefficients(8),
        warmup in prop::collection::vec(-1.0f32..1.0, 0..16),
    ) {
        let mut a = WarpedLatticeShaper::new();
        let mut b = WarpedLatticeShaper::new();
        for shaper in [&mut a, &mut b] {
            shaper.configure(lambda, 8, &k);
            run(shaper, &warmup);
            shaper.configure(lambda * 0.5, 8, &k);
        }
        prop_assert!(a.next_excitation().is_finite());
        prop_assert_eq!(a.next_excitation(), b.next_excitation());
    }
}
