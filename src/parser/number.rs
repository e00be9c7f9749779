// Lenient numeric parsing for spreadsheet-style cell values

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit0, digit1, one_of},
    combinator::{opt, recognize},
    sequence::{pair, tuple},
    IResult,
};

/// Unsigned decimal mantissa: `12`, `12.`, `12.5` or `.5`
pub(crate) fn mantissa(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
        recognize(pair(char('.'), digit1)),
    ))(input)
}

/// Exponent suffix: `e5`, `E-3`, `e+10`
pub(crate) fn exponent(input: &str) -> IResult<&str, &str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)))(input)
}

/// Longest signed decimal literal at the start of `input`
pub fn decimal_literal(input: &str) -> IResult<&str, &str> {
    recognize(tuple((opt(one_of("+-")), mantissa, opt(exponent))))(input)
}

/// `Infinity`, `+Infinity` or `-Infinity`
fn signed_infinity(input: &str) -> IResult<&str, f64> {
    let (input, sign) = opt(one_of("+-"))(input)?;
    let (input, _) = tag("Infinity")(input)?;
    let value = if sign == Some('-') {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    };
    Ok((input, value))
}

/// `0x1F`, `0o17`, `0b101` (no sign allowed)
fn radix_literal(text: &str) -> Option<f64> {
    let prefix = text.get(..2)?.to_ascii_lowercase();
    let radix = match prefix.as_str() {
        "0x" => 16,
        "0o" => 8,
        "0b" => 2,
        _ => return None,
    };
    Some(
        u64::from_str_radix(&text[2..], radix)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN),
    )
}

/// Whole-string numeric conversion.
///
/// Surrounding whitespace is ignored and an empty string is zero. Anything
/// that is not entirely a numeric literal is NaN.
pub fn to_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(value) = radix_literal(trimmed) {
        return value;
    }
    if let Ok(("", value)) = signed_infinity(trimmed) {
        return value;
    }
    match decimal_literal(trimmed) {
        Ok(("", literal)) => literal.parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// Prefix numeric conversion.
///
/// Reads the longest numeric literal after leading whitespace and ignores
/// whatever follows it. NaN when no literal is present.
pub fn parse_float(text: &str) -> f64 {
    let input = text.trim_start();
    if let Ok((_, value)) = signed_infinity(input) {
        return value;
    }
    match decimal_literal(input) {
        Ok((_, literal)) => literal.parse().unwrap_or(f64::NAN),
        Err(_) => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_literal_forms() {
        assert_eq!(decimal_literal("12"), Ok(("", "12")));
        assert_eq!(decimal_literal("12.5rest"), Ok(("rest", "12.5")));
        assert_eq!(decimal_literal(".5"), Ok(("", ".5")));
        assert_eq!(decimal_literal("-3e4"), Ok(("", "-3e4")));
        assert!(decimal_literal("abc").is_err());
    }

    #[test]
    fn test_dangling_exponent_is_not_consumed() {
        assert_eq!(decimal_literal("1e"), Ok(("e", "1")));
        assert_eq!(decimal_literal("2E+"), Ok(("E+", "2")));
    }

    #[test]
    fn test_to_number_whole_string() {
        assert_eq!(to_number("  2.5 "), 2.5);
        assert_eq!(to_number(""), 0.0);
        assert_eq!(to_number("   "), 0.0);
        assert_eq!(to_number("-1e3"), -1000.0);
        assert_eq!(to_number("0x10"), 16.0);
        assert_eq!(to_number("0b101"), 5.0);
        assert_eq!(to_number("-Infinity"), f64::NEG_INFINITY);
        assert!(to_number("12abc").is_nan());
        assert!(to_number("0xZZ").is_nan());
        assert!(to_number("abc").is_nan());
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float("12abc"), 12.0);
        assert_eq!(parse_float("  -0.5"), -0.5);
        assert_eq!(parse_float("1e"), 1.0);
        assert_eq!(parse_float("0x10"), 0.0);
        assert_eq!(parse_float("Infinity and more"), f64::INFINITY);
        assert!(parse_float("").is_nan());
        assert!(parse_float("null").is_nan());
        assert!(parse_float("gene").is_nan());
    }
}
