/*!
Shortest round-trip conversion of `f32` and `f64` values to decimal text.

The conversion kernel is a Schubfach-style algorithm with a fast first
path: in the common case a single 128-bit multiplication against a
precomputed power-of-10 significand decides the shortest decimal, and the
boundary cases fall back to exact interval comparisons under round-to-odd
rounding. Formatting picks fixed or scientific notation from where the
decimal point lands and trims trailing zeros with a packed-BCD pipeline.

```
let mut buffer = fpdec::Buffer::new();
assert_eq!(buffer.format(6.62607015e-34), "6.62607015e-34");
assert_eq!(buffer.format(-0.0f64), "-0");

let mut out = [0u8; fpdec::DOUBLE_BUFFER_SIZE];
let len = fpdec::write_double(&mut out, 1.0e23);
assert_eq!(&out[..len], b"1e+23");
```

The `modsearch` module carries the search utilities used by the
exhaustive per-exponent verifier (the `verify` binary, behind the
`verify` feature), which compares every at-risk significand of a binary
exponent class against a reference implementation.
*/

pub mod flt2dec;
pub mod modsearch;
pub mod wide;

pub use flt2dec::{
    to_decimal, write_double, write_float, Buffer, DecFp, Float, DOUBLE_BUFFER_SIZE,
    FLOAT_BUFFER_SIZE, NON_FINITE_EXP,
};
