/*
End-to-end properties of the writers over random bit patterns: formatted
output must parse back bit-exactly, must agree digit-for-digit with the
reference shortest implementation, and must not be shortenable.
*/

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fpdec::Buffer;

/// (sign, digits without trailing zeros, exponent of the last digit);
/// digits are "0" for zeros. Accepts both this crate's output and ryu's.
fn canonical(text: &str) -> (bool, String, i32) {
    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (mantissa, e) = match text.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().expect("exponent")),
        None => (text, 0),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };
    let digits: String = int_part.chars().chain(frac_part.chars()).collect();
    let mut exp = e - frac_part.len() as i32;
    let leading = digits.trim_start_matches('0');
    let trimmed = leading.trim_end_matches('0');
    exp += (leading.len() - trimmed.len()) as i32;
    if trimmed.is_empty() {
        return (negative, "0".to_string(), 0);
    }
    (negative, trimmed.to_string(), exp)
}

#[test]
fn f64_round_trips_bit_exactly() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0001);
    let mut buffer = Buffer::new();
    let mut checked = 0u32;
    while checked < 50_000 {
        let bits: u64 = rng.gen();
        let value = f64::from_bits(bits);
        if !value.is_finite() {
            continue;
        }
        let text = buffer.format(value);
        let parsed: f64 = text.parse().expect("output must parse");
        assert_eq!(parsed.to_bits(), bits, "{} reparsed differently", text);
        checked += 1;
    }
}

#[test]
fn f32_round_trips_bit_exactly() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0002);
    let mut buffer = Buffer::new();
    let mut checked = 0u32;
    while checked < 50_000 {
        let bits: u32 = rng.gen();
        let value = f32::from_bits(bits);
        if !value.is_finite() {
            continue;
        }
        let text = buffer.format(value);
        let parsed: f32 = text.parse().expect("output must parse");
        assert_eq!(parsed.to_bits(), bits, "{} reparsed differently", text);
        checked += 1;
    }
}

#[test]
fn f64_matches_reference_digits() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0003);
    let mut buffer = Buffer::new();
    let mut reference = ryu::Buffer::new();
    // Uniform bits plus a sweep over every exponent class; uniform alone
    // almost never lands on subnormals or the extremes.
    let mut cases: Vec<u64> = (0..20_000).map(|_| rng.gen()).collect();
    for raw_exp in 0..0x800u64 {
        cases.push((raw_exp << 52) | (rng.gen::<u64>() & ((1 << 52) - 1)));
        cases.push(raw_exp << 52);
        cases.push((raw_exp << 52) | 1);
    }
    for bits in cases {
        let value = f64::from_bits(bits);
        if !value.is_finite() {
            continue;
        }
        let ours = canonical(buffer.format(value));
        let theirs = canonical(reference.format_finite(value));
        assert_eq!(ours, theirs, "bits = {:#018x}", bits);
    }
}

#[test]
fn f32_matches_reference_digits() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0004);
    let mut buffer = Buffer::new();
    let mut reference = ryu::Buffer::new();
    let mut cases: Vec<u32> = (0..20_000).map(|_| rng.gen()).collect();
    for raw_exp in 0..0x100u32 {
        cases.push((raw_exp << 23) | (rng.gen::<u32>() & ((1 << 23) - 1)));
        cases.push(raw_exp << 23);
        cases.push((raw_exp << 23) | 1);
    }
    for bits in cases {
        let value = f32::from_bits(bits);
        if !value.is_finite() {
            continue;
        }
        let ours = canonical(buffer.format(value));
        let theirs = canonical(reference.format_finite(value));
        assert_eq!(ours, theirs, "bits = {:#010x}", bits);
    }
}

#[test]
fn f64_output_is_not_shortenable() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0005);
    let mut buffer = Buffer::new();
    let mut checked = 0u32;
    while checked < 5_000 {
        let bits: u64 = rng.gen();
        let value = f64::from_bits(bits);
        if !value.is_finite() || value == 0.0 {
            continue;
        }
        checked += 1;

        let (_, digits, exp) = canonical(buffer.format(value));
        if digits.len() == 1 {
            continue;
        }
        // If any decimal with one digit fewer round-tripped, it would be
        // the floor or ceiling of the value at that length; rounding
        // intervals nest, so ruling these two out rules out everything
        // shorter.
        let shorter: u64 = digits[..digits.len() - 1].parse().unwrap();
        for candidate in [shorter, shorter + 1] {
            let text = format!("{}e{}", candidate, exp + 1);
            let parsed: f64 = text.parse().unwrap();
            assert_ne!(
                parsed.to_bits(),
                bits,
                "{} also round-trips {:#018x}",
                text,
                bits
            );
        }
    }
}

#[test]
fn half_ulp_ties_choose_even_digits() {
    let mut buffer = Buffer::new();
    // 5444310685350915.5 and ...16.5 sit exactly between representable
    // decimals; the emitted neighbor must have an even last digit.
    assert_eq!(buffer.format(5.444310685350916e14), "544431068535091.6");
    // 10^23 is a midpoint tie where the even (and exactly representable)
    // candidate is the bare power of ten.
    assert_eq!(buffer.format(1.0e23), "1e+23");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(4096))]

    #[test]
    fn f64_round_trip_prop(bits in any::<u64>()) {
        let value = f64::from_bits(bits);
        prop_assume!(value.is_finite());
        let mut buffer = Buffer::new();
        let parsed: f64 = buffer.format(value).parse().unwrap();
        prop_assert_eq!(parsed.to_bits(), bits);
    }

    #[test]
    fn f32_round_trip_prop(bits in any::<u32>()) {
        let value = f32::from_bits(bits);
        prop_assume!(value.is_finite());
        let mut buffer = Buffer::new();
        let parsed: f32 = buffer.format(value).parse().unwrap();
        prop_assert_eq!(parsed.to_bits(), bits);
    }
}
