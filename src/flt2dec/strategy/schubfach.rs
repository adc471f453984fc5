/*
Shortest-decimal conversion kernel based on Schubfach [1] with a fast
first path in the style of yy [2].

The fast path scales the binary significand by a 128-bit power-of-10
significand with a single wide multiplication, then decides between the
one-digit-shorter candidate and the rounded full-length candidate from the
fixed-point remainder alone. It bails out to the fallback whenever the
remainder sits on or next to a decision boundary, where the truncated
table entry could flip the comparison.

The fallback converts the rounding interval endpoints exactly enough by
switching to a strict overestimate of the power of 10 and mapping each
endpoint through a round-to-odd multiply, then picks the unique candidate
inside the interval: the shorter multiple of ten if it fits, otherwise the
nearer (ties-to-even) of the two full-length neighbors.

[1] Raffaello Giulietti, "The Schubfach way to render doubles", 2020.
[2] https://github.com/ibireme/yyjson (the double-to-string path).
*/

use crate::flt2dec::decoder::Ieee754;
use crate::flt2dec::estimator::{decimal_exponent, pow10_exponent_shift};
use crate::flt2dec::pow10;
use crate::wide::{
    umul128, umul128_hi64, umul192_hi128, umul192_upper64_to_odd, umul96_upper32_to_odd,
};

/// Kernel result: the value equals `sig * 10^exp` (sign handled by the
/// caller). `sig_div10` is always `sig / 10`; the formatter wants it
/// precomputed so a vectorized digit writer can slot in without a divide.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ToDecimal {
    pub sig: u64,
    pub exp: i32,
    pub sig_div10: u64,
}

const HALF_ULP: u64 = 1 << 63;

// (2^64 / 10) + 1 without the intermediate 128-bit literal; exact as a
// multiply-high reciprocal over the integral parts the kernel produces.
const DIV10_RECIP: u64 = (1 << 63) / 5 + 1;

/// Converts a normal binary64 significand (implicit bit set) at the given
/// biased exponent. Falls back to [`to_decimal_schubfach64`] on boundary
/// cases and for irregular values.
pub fn to_decimal64(bin_sig: u64, raw_exp: i32, regular: bool) -> ToDecimal {
    let bin_exp = raw_exp - <f64 as Ieee754>::EXP_OFFSET;
    // Irregular values have an asymmetric rounding interval the fast path
    // cannot model; send them straight to the fallback.
    if regular {
        let dec_exp = decimal_exponent(bin_exp, true);
        let shift = pow10_exponent_shift(bin_exp, dec_exp);
        let (pow10_hi, pow10_lo) = pow10::significand(-dec_exp);

        // integral.fractional = bin_sig * 2^bin_exp / 10^dec_exp in 64.64
        // fixed point, modulo the table truncation.
        let (integral, fractional) = umul192_hi128(pow10_hi, pow10_lo, bin_sig << shift);

        // An exact half-ulp tie when rounding to the nearest integer needs
        // the even rule on full-precision values.
        if fractional != HALF_ULP {
            let div10 = umul128_hi64(integral, DIV10_RECIP);
            let digit = integral - div10 * 10;

            // Fixed-point form with the last integral digit in the top
            // four bits and the fraction below it.
            const FRACTIONAL_BITS: u32 = 60;
            let ten = 10u64 << FRACTIONAL_BITS;
            let scaled_sig_mod10 = (digit << FRACTIONAL_BITS) | (fractional >> 4);

            // Half an ulp in the same form. dec_exp makes one ulp land in
            // [1, 10) after scaling; the extra 1 in the shift divides by
            // two.
            let scaled_half_ulp = pow10_hi >> (4 - shift + 1);
            let upper = scaled_sig_mod10 + scaled_half_ulp;

            // Boundary when rounding down to the nearest ten, and the
            // near-boundary band when rounding up; upper == ten alone is
            // not enough (1.342178e+08 as binary32 is the counterexample).
            if scaled_sig_mod10 != scaled_half_ulp && ten.wrapping_sub(upper) > 1 {
                let round_up = upper >= ten;
                let shorter = integral - digit + if round_up { 10 } else { 0 };
                let longer = integral + (fractional >= HALF_ULP) as u64;
                let use_shorter = scaled_sig_mod10 <= scaled_half_ulp || round_up;
                let (sig, sig_div10) = if use_shorter {
                    (shorter, div10 + round_up as u64)
                } else {
                    (longer, div10)
                };
                return ToDecimal { sig, exp: dec_exp, sig_div10 };
            }
        }
    }
    to_decimal_schubfach64(bin_sig, bin_exp, regular, false)
}

/// The binary32 fast path; same scheme with a 64x64 product and a 32-bit
/// fixed-point fraction.
pub fn to_decimal32(bin_sig: u32, raw_exp: i32, regular: bool) -> ToDecimal {
    let bin_exp = raw_exp - <f32 as Ieee754>::EXP_OFFSET;
    if regular {
        let dec_exp = decimal_exponent(bin_exp, true);
        let shift = pow10_exponent_shift(bin_exp, dec_exp);
        let (pow10_hi, _) = pow10::significand(-dec_exp);

        let p = umul128(pow10_hi, (bin_sig as u64) << shift);
        let integral = (p >> 64) as u64;
        let fractional = p as u64;

        if fractional != HALF_ULP {
            let div10 = umul128_hi64(integral, DIV10_RECIP);
            let digit = integral - div10 * 10;

            const FRACTIONAL_BITS: u32 = 32;
            let ten = 10u64 << FRACTIONAL_BITS;
            let scaled_sig_mod10 = (digit << FRACTIONAL_BITS) | (fractional >> 32);

            let scaled_half_ulp = pow10_hi >> (32 - shift + 1);
            let upper = scaled_sig_mod10 + scaled_half_ulp;

            if scaled_sig_mod10 != scaled_half_ulp && ten.wrapping_sub(upper) > 1 {
                let round_up = upper >= ten;
                let shorter = integral - digit + if round_up { 10 } else { 0 };
                let longer = integral + (fractional >= HALF_ULP) as u64;
                let use_shorter = scaled_sig_mod10 <= scaled_half_ulp || round_up;
                let (sig, sig_div10) = if use_shorter {
                    (shorter, div10 + round_up as u64)
                } else {
                    (longer, div10)
                };
                return ToDecimal { sig, exp: dec_exp, sig_div10 };
            }
        }
    }
    to_decimal_schubfach32(bin_sig, bin_exp, regular, false)
}

/// Schubfach fallback for binary64. `bin_exp` is already unbiased; pass
/// `subnormal` to have the result normalized up to 17 digits.
pub fn to_decimal_schubfach64(bin_sig: u64, bin_exp: i32, regular: bool, subnormal: bool) -> ToDecimal {
    let dec_exp = decimal_exponent(bin_exp, regular);
    let shift = pow10_exponent_shift(bin_exp, dec_exp);
    let (pow10_hi, pow10_lo) = pow10::significand(-dec_exp);
    // The table stores the power rounded down; the interval comparisons
    // below need a strict overestimate instead.
    let pow10_lo = pow10_lo + 1;

    // Shift so the rounding interval endpoints are integers: the upper
    // boundary is half an ulp away (two quarters), the lower one two
    // quarters for regular values and one for irregular.
    let bin_sig_shifted = bin_sig << 2;
    let lsb = bin_sig & 1;

    // Map the endpoints through the power of 10 with round-to-odd, then
    // nudge by the significand's parity so that an even significand keeps
    // its inclusive bounds and an odd one loses them.
    let lower_scaled = (bin_sig_shifted - if regular { 2 } else { 1 }) << shift;
    let lower = umul192_upper64_to_odd(pow10_hi, pow10_lo, lower_scaled) + lsb;
    let upper_scaled = (bin_sig_shifted + 2) << shift;
    let upper = umul192_upper64_to_odd(pow10_hi, pow10_lo, upper_scaled) - lsb;

    // A single shorter candidate: the largest multiple of ten not above
    // the upper bound. In range iff it also clears the lower bound.
    let div10 = (upper >> 2) / 10;
    let shorter = div10 * 10;
    if shorter << 2 >= lower {
        return normalize64(
            ToDecimal { sig: shorter, exp: dec_exp, sig_div10: div10 },
            subnormal,
        );
    }

    // Otherwise pick the nearer of the two full-length neighbors of the
    // scaled value, ties to even, clipped by interval membership.
    let scaled = umul192_upper64_to_odd(pow10_hi, pow10_lo, bin_sig_shifted << shift);
    let below = scaled >> 2;
    let above = below + 1;
    let cmp = scaled.wrapping_sub((below + above) << 1) as i64;
    let below_closer = cmp < 0 || (cmp == 0 && below & 1 == 0);
    let below_in = below << 2 >= lower;
    let sig = if below_closer && below_in { below } else { above };
    normalize64(ToDecimal { sig, exp: dec_exp, sig_div10: sig / 10 }, subnormal)
}

/// Schubfach fallback for binary32. Only the high word of the table entry
/// participates at this precision, so the overestimate bumps it instead.
pub fn to_decimal_schubfach32(bin_sig: u32, bin_exp: i32, regular: bool, subnormal: bool) -> ToDecimal {
    let dec_exp = decimal_exponent(bin_exp, regular);
    let shift = pow10_exponent_shift(bin_exp, dec_exp);
    let (pow10_hi, _) = pow10::significand(-dec_exp);
    let pow10_hi = pow10_hi + 1;

    let bin_sig_shifted = bin_sig << 2;
    let lsb = bin_sig & 1;

    let lower_scaled = (bin_sig_shifted - if regular { 2 } else { 1 }) << shift;
    let lower = umul96_upper32_to_odd(pow10_hi, lower_scaled) + lsb;
    let upper_scaled = (bin_sig_shifted + 2) << shift;
    let upper = umul96_upper32_to_odd(pow10_hi, upper_scaled) - lsb;

    let div10 = (upper >> 2) / 10;
    let shorter = div10 * 10;
    if shorter << 2 >= lower {
        return normalize32(
            ToDecimal { sig: shorter as u64, exp: dec_exp, sig_div10: div10 as u64 },
            subnormal,
        );
    }

    let scaled = umul96_upper32_to_odd(pow10_hi, bin_sig_shifted << shift);
    let below = scaled >> 2;
    let above = below + 1;
    let cmp = scaled.wrapping_sub((below + above) << 1) as i32;
    let below_closer = cmp < 0 || (cmp == 0 && below & 1 == 0);
    let below_in = below << 2 >= lower;
    let sig = if below_closer && below_in { below } else { above };
    normalize32(
        ToDecimal { sig: sig as u64, exp: dec_exp, sig_div10: (sig / 10) as u64 },
        subnormal,
    )
}

fn normalize64(mut dec: ToDecimal, subnormal: bool) -> ToDecimal {
    if !subnormal {
        return dec;
    }
    // Subnormal results can come out arbitrarily short; scale up to the
    // full 17 digits so the formatter sees a uniform range.
    while dec.sig < 10_000_000_000_000_000 {
        dec.sig *= 10;
        dec.exp -= 1;
    }
    dec.sig_div10 = dec.sig / 10;
    dec
}

fn normalize32(mut dec: ToDecimal, subnormal: bool) -> ToDecimal {
    if !subnormal {
        return dec;
    }
    while dec.sig < 100_000_000 {
        dec.sig *= 10;
        dec.exp -= 1;
    }
    dec.sig_div10 = dec.sig / 10;
    dec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flt2dec::decoder::{decode, Decoded, FullDecoded};

    fn convert64(v: f64) -> ToDecimal {
        match decode(v) {
            (_, FullDecoded::Finite(Decoded { sig, raw_exp, regular, subnormal: false })) => {
                to_decimal64(sig, raw_exp, regular)
            }
            (_, FullDecoded::Finite(Decoded { sig, raw_exp: _, regular, subnormal: true })) => {
                to_decimal_schubfach64(sig, 1 - <f64 as Ieee754>::EXP_OFFSET, regular, true)
            }
            _ => panic!("not finite"),
        }
    }

    fn convert32(v: f32) -> ToDecimal {
        match decode(v) {
            (_, FullDecoded::Finite(Decoded { sig, raw_exp, regular, subnormal: false })) => {
                to_decimal32(sig as u32, raw_exp, regular)
            }
            (_, FullDecoded::Finite(Decoded { sig, raw_exp: _, regular, subnormal: true })) => {
                to_decimal_schubfach32(sig as u32, 1 - <f32 as Ieee754>::EXP_OFFSET, regular, true)
            }
            _ => panic!("not finite"),
        }
    }

    #[test]
    fn known_doubles() {
        // 6.62607015e-34 = 66260701500000000 * 10^-50 (the Planck value
        // pins the full 17-digit path with trailing zeros intact).
        let dec = convert64(6.62607015e-34);
        assert_eq!((dec.sig, dec.exp), (66260701500000000, -50));
        assert_eq!(dec.sig_div10, dec.sig / 10);

        // An exact half-ulp tie when rounding to the nearest integer;
        // resolved on the fallback path, last significant digit even.
        // The scaled integral keeps its trailing zero; the formatter
        // strips it.
        let dec = convert64(5.444310685350916e14);
        assert_eq!((dec.sig, dec.exp), (54443106853509160, -2));

        // Schubfach shorter-candidate exercises on both extremes.
        let dec = convert64(4.932096661796888e-226);
        assert_eq!((dec.sig, dec.exp), (49320966617968880, -242));
        let dec = convert64(3.439070283483335e35);
        assert_eq!((dec.sig, dec.exp), (34390702834833350, 19));
    }

    #[test]
    fn one_is_sixteen_zeros() {
        let dec = convert64(1.0);
        assert_eq!((dec.sig, dec.exp), (10_000_000_000_000_000, -16));
        assert_eq!(dec.sig_div10, 1_000_000_000_000_000);
    }

    #[test]
    fn smallest_subnormal_double() {
        let dec = convert64(f64::from_bits(1));
        assert_eq!((dec.sig, dec.exp), (50_000_000_000_000_000, -340));
    }

    #[test]
    fn known_floats() {
        // The float that motivates the near-boundary bailout.
        let dec = convert32(1.342178e8f32);
        assert_eq!((dec.sig, dec.exp), (13421780, 1));

        // Smallest positive subnormal: shortest form is a bare 1, scaled
        // up to nine digits by normalization.
        let dec = convert32(f32::from_bits(1));
        assert_eq!((dec.sig, dec.exp), (100_000_000, -53));
    }

    #[test]
    fn sig_div10_invariant_holds() {
        // Deterministic sweep across exponent classes and significand
        // patterns; the invariant must hold on every path.
        let mut sig = 0x000f_ffff_ffff_fffeu64;
        for raw_exp in (1..0x7ff).step_by(13) {
            sig = sig.wrapping_mul(0x9e3779b97f4a7c15).rotate_left(17);
            let bin_sig = (sig & ((1 << 52) - 1)) | (1 << 52);
            let dec = to_decimal64(bin_sig, raw_exp, bin_sig & ((1 << 52) - 1) != 0);
            assert_eq!(dec.sig_div10, dec.sig / 10, "raw_exp = {}", raw_exp);
        }
    }
}
