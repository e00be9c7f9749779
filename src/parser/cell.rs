// Dynamic typing of raw delimited-text cells

use super::number::{exponent, mantissa};
use crate::data::Value;
use nom::{
    character::complete::{char, multispace0},
    combinator::{eof, opt, recognize},
    sequence::{delimited, pair, tuple},
    IResult,
};

/// Magnitude limit for cells typed as numbers (2^53); larger literals stay text.
const MAX_SAFE_MAGNITUDE: f64 = 9_007_199_254_740_992.0;

/// A plain decimal literal padded with optional whitespace.
/// Only a leading `-` is accepted, `+5` stays text.
fn numeric_cell(input: &str) -> IResult<&str, &str> {
    delimited(
        multispace0,
        recognize(tuple((opt(char('-')), mantissa, opt(exponent)))),
        pair(multispace0, eof),
    )(input)
}

/// Type a raw cell the way uploaded tables are typed.
pub fn infer_cell(raw: &str) -> Value {
    match raw {
        "" => Value::Empty,
        "true" | "TRUE" => Value::Bool(true),
        "false" | "FALSE" => Value::Bool(false),
        _ => match numeric_cell(raw) {
            Ok((_, literal)) => match literal.parse::<f64>() {
                Ok(n) if n > -MAX_SAFE_MAGNITUDE && n < MAX_SAFE_MAGNITUDE => Value::Number(n),
                _ => Value::Text(raw.to_string()),
            },
            Err(_) => Value::Text(raw.to_string()),
        },
    }
}
