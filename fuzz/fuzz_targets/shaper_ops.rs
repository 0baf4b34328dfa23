#![no_main]

use libfuzzer_sys::fuzz_target;
use warpshaper_dsp::{WarpedLatticeShaper, MAX_ORDER};

fn read_f32(chunk: &[u8]) -> f32 {
    let mut bytes = [0u8; 4];
    bytes[..chunk.len()].copy_from_slice(chunk);
    f32::from_le_bytes(bytes)
}

// Opcode byte followed by a 4 byte little-endian operand.
fuzz_target!(|data: &[u8]| {
    let mut shaper = WarpedLatticeShaper::new();
    let mut coefficients = [0.0f32; MAX_ORDER + 8];
    for op in data.chunks(5) {
        let operand = read_f32(&op[1..]);
        match op[0] % 4 {
            0 => {
                let order = usize::from(op[0] >> 2);
                shaper.configure(operand, order, &coefficients);
                assert!(shaper.order() <= MAX_ORDER);
                assert_eq!(shaper.coefficients().len(), shaper.order());
            }
            1 => {
                let slot = usize::from(op[0] >> 2) % coefficients.len();
                coefficients[slot] = operand;
            }
            2 => shaper.advance(operand),
            _ => {
                shaper.reset();
                assert_eq!(shaper.next_excitation(), 0.0);
            }
        }
    }
});
