use super::*;
use proptest::prelude::*;

// Property: integer round trip through 26.6
proptest! {
    #[test]
    fn prop_int_round_trip(x in -1_000_000i32..1_000_000) {
        let f = Fixed::from_int(x);
        prop_assert_eq!(f.truncate(), x);
        prop_assert_eq!(f.to_int(), x);
        prop_assert_eq!(f.round(), f);
        prop_assert_eq!(f.floor(), f);
        prop_assert_eq!(f.ceil(), f);
    }
}

// Property: floor <= value <= ceil, and both are whole pixels
proptest! {
    #[test]
    fn prop_floor_ceil_bracket(raw in -10_000_000i32..10_000_000) {
        let f = Fixed::from_raw(raw);
        prop_assert!(f.floor() <= f);
        prop_assert!(f.ceil() >= f);
        prop_assert_eq!(f.floor().raw() % 64, 0);
        prop_assert_eq!(f.ceil().raw() % 64, 0);
        prop_assert!((f.round() - f).abs() <= Fixed::HALF);
    }
}

// Property: multiplying by one and dividing by one are identities
proptest! {
    #[test]
    fn prop_mul_div_identity(raw in -10_000_000i32..10_000_000) {
        let f = Fixed::from_raw(raw);
        prop_assert_eq!(f * Fixed::ONE, f);
        prop_assert_eq!(f / Fixed::ONE, f);
        prop_assert_eq!(f * 1, f);
        prop_assert_eq!(f / 1, f);
    }
}

// Property: multiplication is symmetric in sign
proptest! {
    #[test]
    fn prop_mul_sign_symmetry(a in -100_000i32..100_000, b in -100_000i32..100_000) {
        let (a, b) = (Fixed::from_raw(a), Fixed::from_raw(b));
        prop_assert_eq!(a * b, b * a);
        prop_assert_eq!((-a) * b, -(a * b));
    }
}

// Property: growing the glyph buffer keeps every column the same length and
// preserves what was written
proptest! {
    #[test]
    fn prop_grow_preserves(first in 1usize..40, extra in 0usize..80, seed in any::<u32>()) {
        let mut buffer = GlyphBuffer::with_len(first).unwrap();
        {
            let layout = buffer.layout_mut(0, first);
            for i in 0..first {
                layout.glyphs[i] = seed.wrapping_add(i as u32);
                layout.advances_x[i] = Fixed::from_raw(i as i32);
            }
        }
        buffer.reallocate(first + extra).unwrap();
        let layout = buffer.layout(0, buffer.len());
        prop_assert_eq!(layout.len(), first + extra);
        prop_assert_eq!(layout.advances_y.len(), layout.len());
        prop_assert_eq!(layout.justifications.len(), layout.len());
        for i in 0..first {
            prop_assert_eq!(layout.glyphs[i], seed.wrapping_add(i as u32));
            prop_assert_eq!(layout.advances_x[i], Fixed::from_raw(i as i32));
        }
        for i in first..first + extra {
            prop_assert_eq!(layout.glyphs[i], 0);
        }
    }
}
