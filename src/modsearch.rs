/*
Modular search utilities behind the exhaustive verifier: a solver for
linear congruential inequalities and an enumerator for the significands
whose power-of-ten product wraps its low 64 bits.
*/

/// Returned by [`find_min_n`] when no solution exists.
pub const NOT_FOUND: u64 = u64::MAX;

/// Smallest `n >= 0` such that `(n * step) % modulo` lies in
/// `[lower, upper]`, or [`NOT_FOUND`] if no such `n` exists. Callers keep
/// `upper` below `modulo`.
///
/// Euclidean interval reduction: either some multiple of `step` reaches
/// the interval before the first wraparound (the ceiling test below), or
/// every relevant multiple is determined by its residue pattern and the
/// problem recurses with `(modulo % step, step)` and the interval
/// reflected. Terminates because the parameters shrink the way the
/// Euclidean algorithm's do.
pub fn find_min_n(step: u64, modulo: u128, lower: u64, upper: u64) -> u64 {
    if step == 0 {
        return NOT_FOUND;
    }
    if lower > upper {
        return NOT_FOUND;
    }
    if lower == 0 {
        return 0;
    }

    // Direct hit without wrapping.
    let n = (lower - 1) / step + 1; // ceil(lower / step)
    if n as u128 * step as u128 <= upper as u128 {
        return n;
    }

    let rem_upper = upper % step;
    let rem_lower = lower % step;
    let n = find_min_n(
        (modulo % step as u128) as u64,
        step as u128,
        if rem_upper != 0 { step - rem_upper } else { 0 },
        if rem_lower != 0 { step - rem_lower } else { 0 },
    );
    if n == NOT_FOUND {
        return NOT_FOUND;
    }
    ((n as u128 * modulo + lower as u128 + step as u128 - 1) / step as u128) as u64
}

/// Calls `on_hit(i)` for exactly those offsets `i` with
/// `s = bin_sig_first + i` in `[bin_sig_first, bin_sig_last)` for which
/// `pow10_lo * (s << exp_shift) + (s << exp_shift)` overflows 64 bits.
///
/// Those are the significands whose scaled low half can carry into the
/// integral part, which makes them the only candidates the truncated
/// power-of-10 table could convert differently from an exact one. The
/// walk jumps between candidates with [`find_min_n`] against the lowest
/// wrap threshold of the whole range and keeps the candidates that carry
/// for their own significand, so no per-significand sweep is needed.
pub fn find_carried_away_doubles<F: FnMut(u64)>(
    pow10_lo: u64,
    exp_shift: u32,
    bin_sig_first: u64,
    bin_sig_last: u64,
    mut on_hit: F,
) {
    let count = bin_sig_last - bin_sig_first;
    let step = pow10_lo.wrapping_mul(1 << exp_shift);
    let mut start = pow10_lo.wrapping_mul(bin_sig_first << exp_shift);
    // The exact threshold is 2^64 - (s << exp_shift), which moves with s;
    // jumping against the lowest one over the range gives a superset of
    // the hits, filtered below.
    let threshold = u64::MAX
        .wrapping_sub((bin_sig_last - 1) << exp_shift)
        .wrapping_add(1);

    let mut total: u64 = 0;
    loop {
        let n = if start >= threshold {
            0
        } else {
            let n = find_min_n(step, 1u128 << 64, threshold - start, u64::MAX - start);
            if n == NOT_FOUND {
                return;
            }
            n
        };
        total += n;
        if total >= count {
            return;
        }
        let hit = start.wrapping_add(n.wrapping_mul(step));
        let bin_sig_shifted = (bin_sig_first + total) << exp_shift;
        if hit.wrapping_add(bin_sig_shifted) < hit {
            on_hit(total);
        }
        start = hit.wrapping_add(step);
        total += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn find_min_n_basics() {
        // (12345 * 0) % 100000 = 0 is already inside [0, 1000].
        assert_eq!(find_min_n(12345, 100000, 0, 1000), 0);

        // (1 * 500) % 1000 = 500, inside [400, 500].
        assert_eq!(find_min_n(500, 1000, 400, 500), 1);

        // Multiple steps without a modulus wrap: 10, 20, 30, 40, 50.
        assert_eq!(find_min_n(10, 100, 45, 55), 5);

        // Requires the reduction: 300, 600, 900, then 1200 % 1000 = 200.
        assert_eq!(find_min_n(300, 1000, 100, 200), 4);

        // Unsolvable: step and modulus even, target odd.
        assert_eq!(find_min_n(2, 100, 5, 5), NOT_FOUND);

        // An empty interval never matches.
        assert_eq!(find_min_n(3, 100, 7, 6), NOT_FOUND);

        // A zero step only ever produces residue 0.
        assert_eq!(find_min_n(0, 100, 5, 10), NOT_FOUND);
    }

    #[test]
    fn find_min_n_near_overflow() {
        let n = find_min_n(
            0x6000000000000001,
            1u128 << 64,
            0xffffffffffffff00,
            0xffffffffffffffff,
        );
        assert_eq!(n, 0x1fffffffffffff05);
    }

    #[test]
    fn find_min_n_significand_search() {
        // The jump the carry enumerator performs, spelled out once: find
        // the first significand in the top binade whose scaled low half
        // lands above the wrap threshold.
        let bin_sig_first: u64 = (1 << 52) | 1;
        let bin_sig_last: u64 = (1 << 53) - 1;
        let pow10_lo: u64 = 0x6c07a2c26a8346d1;
        let exp_shift: u32 = 3;

        let start = (bin_sig_first << exp_shift).wrapping_mul(pow10_lo);
        let step = (1u64 << exp_shift).wrapping_mul(pow10_lo);
        let threshold = u64::MAX - (bin_sig_last << exp_shift) + 1;

        let n = find_min_n(step, 1u128 << 64, threshold - start, u64::MAX - start);

        assert!(n > 0);
        assert!(start.wrapping_add(n.wrapping_mul(step)) >= threshold);
        assert!(start.wrapping_add((n - 1).wrapping_mul(step)) < threshold);
    }

    fn brute_force_carries(
        pow10_lo: u64,
        exp_shift: u32,
        first: u64,
        last: u64,
    ) -> Vec<u64> {
        let mut hits = Vec::new();
        for s in first..last {
            let shifted = s << exp_shift;
            let low = pow10_lo.wrapping_mul(shifted);
            if low.wrapping_add(shifted) < low {
                hits.push(s - first);
            }
        }
        hits
    }

    #[test]
    fn carried_away_doubles_match_brute_force() {
        let pow10_lo: u64 = 0x6c07a2c26a8346d1;
        let exp_shift: u32 = 3;
        let first: u64 = (1 << 52) | 1;
        let last: u64 = (1 << 52) | (1 << 20);

        let expected = brute_force_carries(pow10_lo, exp_shift, first, last);
        let mut actual = Vec::new();
        find_carried_away_doubles(pow10_lo, exp_shift, first, last, |i| actual.push(i));

        assert_eq!(expected.len(), 2048);
        assert_eq!(expected, actual);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn find_min_n_matches_brute_force(
            step in 0u64..5_000,
            modulo in 1u64..1_000_000,
            lower in 0u64..1_000_000,
            upper in 0u64..1_000_000,
        ) {
            prop_assume!(upper < modulo);
            // The residues of n * step repeat with period at most modulo,
            // so a brute scan that far is a complete oracle.
            let expected = (0..modulo)
                .find(|&n| {
                    let r = ((n as u128 * step as u128) % modulo as u128) as u64;
                    lower <= r && r <= upper
                })
                .unwrap_or(NOT_FOUND);
            prop_assert_eq!(find_min_n(step, modulo as u128, lower, upper), expected);
        }

        #[test]
        fn carried_away_matches_brute_force_random(
            pow10_lo in any::<u64>(),
            exp_shift in 0u32..5,
            first in (1u64 << 52)..(1u64 << 52) + (1 << 30),
            len in 1u64..(1 << 14),
        ) {
            let last = first + len;
            let expected = brute_force_carries(pow10_lo, exp_shift, first, last);
            let mut actual = Vec::new();
            find_carried_away_doubles(pow10_lo, exp_shift, first, last, |i| actual.push(i));
            prop_assert_eq!(expected, actual);
        }
    }
}
