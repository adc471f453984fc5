/*
Helpers for the formatter tests: render through the public writers and
compare the full byte output.
*/

macro_rules! check_double {
    ($value:expr => $expected:expr) => {{
        let value: f64 = $value;
        let mut buffer = [0u8; crate::flt2dec::DOUBLE_BUFFER_SIZE];
        let len = crate::flt2dec::write_double(&mut buffer, value);
        assert!(len <= buffer.len());
        assert_eq!(
            core::str::from_utf8(&buffer[..len]).unwrap(),
            $expected,
            "formatting {:?} ({:#018x})",
            value,
            value.to_bits()
        );
    }};
}

macro_rules! check_float {
    ($value:expr => $expected:expr) => {{
        let value: f32 = $value;
        let mut buffer = [0u8; crate::flt2dec::FLOAT_BUFFER_SIZE];
        let len = crate::flt2dec::write_float(&mut buffer, value);
        assert!(len <= buffer.len());
        assert_eq!(
            core::str::from_utf8(&buffer[..len]).unwrap(),
            $expected,
            "formatting {:?} ({:#010x})",
            value,
            value.to_bits()
        );
    }};
}
