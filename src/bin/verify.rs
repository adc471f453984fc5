/*
Exhaustive correctness checker for one binary64 exponent class.

With a truncated power-of-10 table, the only significands a conversion
could get wrong are the ones whose scaled low product half carries into
the integral part; everything else is covered by the kernel's
conservative boundary checks. Those "carried away" significands are
enumerated without sweeping the whole class, and each one is compared
against a reference implementation and round-tripped through the
standard parser.

Usage: verify RAW_EXPONENT [NUM_THREADS]

RAW_EXPONENT is the biased binary64 exponent to check, in [1, 0x7fe].
Results go to stdout, progress to stderr. Exit status: 0 when everything
matched (or the class uses an exact power of 10 and needs no check),
1 on any mismatch, 2 on a bad invocation.
*/

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use fpdec::flt2dec::estimator::{decimal_exponent, pow10_exponent_shift};
use fpdec::flt2dec::strategy::schubfach::to_decimal64;
use fpdec::flt2dec::{pow10, Ieee754};
use fpdec::modsearch::find_carried_away_doubles;

const NUM_SIG_BITS: u32 = <f64 as Ieee754>::NUM_SIG_BITS;
const EXP_MASK: i32 = <f64 as Ieee754>::EXP_MASK;
const EXP_OFFSET: i32 = <f64 as Ieee754>::EXP_OFFSET;
const IMPLICIT_BIT: u64 = <f64 as Ieee754>::IMPLICIT_BIT;

fn usage() -> ExitCode {
    eprintln!("usage: verify RAW_EXPONENT [NUM_THREADS]");
    ExitCode::from(2)
}

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return usage();
    };
    let Ok(raw_exp) = arg.parse::<i32>() else {
        return usage();
    };
    let num_threads = match args.next() {
        Some(arg) => match arg.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => return usage(),
        },
        None => std::thread::available_parallelism().map_or(1, |n| n.get()),
    };

    if raw_exp <= 0 || raw_exp >= EXP_MASK {
        eprintln!("unsupported raw exponent {raw_exp}");
        return ExitCode::from(2);
    }

    let bin_exp = raw_exp - EXP_OFFSET;
    let dec_exp = decimal_exponent(bin_exp, true);
    let exp_shift = pow10_exponent_shift(bin_exp, dec_exp);

    if pow10::is_exact(-dec_exp) {
        println!(
            "power of 10 is exact for bin_exp={bin_exp} dec_exp={dec_exp}; nothing to verify"
        );
        return ExitCode::SUCCESS;
    }
    let (_, pow10_lo) = pow10::significand(-dec_exp);

    eprintln!(
        "verifying raw_exp={raw_exp} (bin_exp={bin_exp}, dec_exp={dec_exp}, \
         shift={exp_shift}) on {num_threads} threads"
    );

    let num_significands: u64 = 1 << NUM_SIG_BITS;
    let processed = AtomicU64::new(0);
    let special = AtomicU64::new(0);
    let errors = AtomicU64::new(0);
    let done = AtomicBool::new(false);

    let started = Instant::now();
    std::thread::scope(|scope| {
        let mut workers = Vec::with_capacity(num_threads);
        for i in 0..num_threads as u64 {
            let (processed, special, errors) = (&processed, &special, &errors);
            workers.push(scope.spawn(move || {
                let mut begin = num_significands * i / num_threads as u64;
                let end = num_significands * (i + 1) / num_threads as u64;
                // Significand zero is the irregular value with the
                // asymmetric interval; it is checked by the fixed tests.
                if begin == 0 {
                    begin = 1;
                }
                // Offsets are relative to the implicit bit; the exclusive
                // end of the last partition is the full next binade.
                let begin = IMPLICIT_BIT + begin;
                let end = IMPLICIT_BIT + end;

                let mut reported = false;
                let mut flushed = 0u64;
                let mut ryu_buffer = ryu::Buffer::new();
                find_carried_away_doubles(pow10_lo, exp_shift, begin, end, |offset| {
                    special.fetch_add(1, Ordering::Relaxed);
                    processed.fetch_add(offset + 1 - flushed, Ordering::Relaxed);
                    flushed = offset + 1;
                    if let Err(report) = verify_one(begin + offset, raw_exp, &mut ryu_buffer) {
                        errors.fetch_add(1, Ordering::Relaxed);
                        if !reported {
                            reported = true;
                            println!("{report}");
                        }
                    }
                });
                processed.fetch_add(end - begin - flushed, Ordering::Relaxed);
            }));
        }

        let progress = scope.spawn(|| {
            let percent = 100.0 / num_significands as f64;
            while !done.load(Ordering::Relaxed) {
                std::thread::sleep(Duration::from_millis(100));
                eprintln!(
                    "progress: {:7.4}%",
                    processed.load(Ordering::Relaxed) as f64 * percent
                );
            }
        });

        for worker in workers {
            worker.join().expect("worker panicked");
        }
        done.store(true, Ordering::Relaxed);
        progress.join().expect("progress thread panicked");
    });

    println!(
        "{} errors and {} special cases in {} values in {:.2} seconds",
        errors.load(Ordering::Relaxed),
        special.load(Ordering::Relaxed),
        processed.load(Ordering::Relaxed),
        started.elapsed().as_secs_f64()
    );
    if errors.load(Ordering::Relaxed) != 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Checks a single significand of the exponent class against the
/// reference digits and the standard parser.
fn verify_one(bin_sig: u64, raw_exp: i32, ryu_buffer: &mut ryu::Buffer) -> Result<(), String> {
    let bits = ((raw_exp as u64) << NUM_SIG_BITS) | (bin_sig ^ IMPLICIT_BIT);
    let value = f64::from_bits(bits);

    let regular = bin_sig & (IMPLICIT_BIT - 1) != 0;
    let dec = to_decimal64(bin_sig, raw_exp, regular);
    let ours = canonical_digits(dec.sig, dec.exp);
    let reference = parse_reference(ryu_buffer.format_finite(value));

    let mut out = [0u8; fpdec::DOUBLE_BUFFER_SIZE];
    let len = fpdec::write_double(&mut out, value);
    let text = std::str::from_utf8(&out[..len]).expect("writer emits ASCII");
    let round_trip: f64 = text.parse().expect("writer output must parse");

    if ours == reference && round_trip.to_bits() == bits {
        return Ok(());
    }
    Err(format!(
        "mismatch for {bits:#018x}: fpdec {text} ({} * 10^{}), reference {}",
        dec.sig,
        dec.exp,
        ryu_buffer.format_finite(value),
    ))
}

/// Strips trailing zeros and normalizes to (digits, exponent of the last
/// digit), the form both sides are compared in.
fn canonical_digits(mut sig: u64, mut exp: i32) -> (String, i32) {
    debug_assert!(sig != 0);
    while sig % 10 == 0 {
        sig /= 10;
        exp += 1;
    }
    (sig.to_string(), exp)
}

/// Reduces a ryu rendering (`123.45`, `1.5e300`, `5e-324`) to the same
/// canonical form as [`canonical_digits`].
fn parse_reference(text: &str) -> (String, i32) {
    let (mantissa, e) = match text.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().expect("reference exponent")),
        None => (text, 0),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };
    let digits: String = int_part.chars().chain(frac_part.chars()).collect();
    let mut exp = e - frac_part.len() as i32;
    let trimmed = digits.trim_start_matches('0');
    let mut digits = trimmed.trim_end_matches('0').to_string();
    exp += trimmed.len() as i32 - digits.len() as i32;
    if digits.is_empty() {
        digits.push('0');
    }
    (digits, exp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_parsing() {
        assert_eq!(parse_reference("123.45"), ("12345".to_string(), -2));
        assert_eq!(parse_reference("1.0"), ("1".to_string(), 0));
        assert_eq!(parse_reference("5e-324"), ("5".to_string(), -324));
        assert_eq!(parse_reference("1.7976931348623157e308"), ("17976931348623157".to_string(), 292));
        assert_eq!(parse_reference("100.0"), ("1".to_string(), 2));
    }

    #[test]
    fn canonical_digits_strip_zeros() {
        assert_eq!(canonical_digits(66260701500000000, -50), ("662607015".to_string(), -42));
        assert_eq!(canonical_digits(1, 0), ("1".to_string(), 0));
        assert_eq!(canonical_digits(10_000_000_000_000_000, -16), ("1".to_string(), 0));
    }
}
