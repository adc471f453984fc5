/*
Fixed-point logarithm estimates driving the power-of-10 table lookups.
*/

// log10(2) and -log10(3/4) scaled by 2^20. The second constant is rounded
// to a power of two on purpose: the combined expression stays exact over
// the asserted range only with this value.
const LOG10_2_SIG: i32 = 315_653;
const LOG10_3_OVER_4_SIG: i32 = 131_072;
const LOG10_2_EXP: u32 = 20;

// log2(10) scaled by 2^16, plus one so the truncation below always lands
// on floor(log2(10^-dec_exp)) rather than one short of it.
const LOG2_POW10_SIG: i32 = 217_707;
const LOG2_POW10_EXP: u32 = 16;

/// `floor(log10(2^bin_exp))` if `regular`, `floor(log10(3/4 * 2^bin_exp))`
/// otherwise, exact for `bin_exp` in `[-1334, 2620]`.
///
/// The irregular variant shifts the estimate for values whose stored
/// fraction is zero: their rounding interval is centered 3/4 of an ulp
/// below the value, not 1/2.
#[inline]
pub fn decimal_exponent(bin_exp: i32, regular: bool) -> i32 {
    debug_assert!((-1334..=2620).contains(&bin_exp));
    (bin_exp * LOG10_2_SIG - (!regular as i32) * LOG10_3_OVER_4_SIG) >> LOG10_2_EXP
}

/// Shift aligning the scaled significand so that multiplying by the table
/// entry for `10^-dec_exp` leaves the integral/fractional split at a fixed
/// bit position, exact for `dec_exp` in `[-350, 350]`.
///
/// Different binary exponents can map to the same decimal exponent while
/// placing the decimal point at different bit positions; the shift
/// compensates. For example 3 * 2^59 and 3 * 2^60 both have `dec_exp = 2`,
/// yet dividing them by 100 puts the leading digit one bit apart.
#[inline]
pub fn pow10_exponent_shift(bin_exp: i32, dec_exp: i32) -> u32 {
    debug_assert!((-350..=350).contains(&dec_exp));
    // floor(log2(10^-dec_exp)); the table entry equals
    // 10^-dec_exp * 2^(127 - pow10_bin_exp).
    let pow10_bin_exp = (-dec_exp * LOG2_POW10_SIG) >> LOG2_POW10_EXP;
    (bin_exp + pow10_bin_exp + 1) as u32
}
