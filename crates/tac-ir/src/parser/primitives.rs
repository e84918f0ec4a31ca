//! Primitive parsers for temps, labels, names, and literals.

use alloc::string::{String, ToString};

use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::char,
    combinator::{map, map_res, opt, recognize},
    sequence::{pair, preceded},
    IResult,
};

use crate::temp::Temp;

/// Parse an integer literal
pub(crate) fn integer(input: &str) -> IResult<&str, i32> {
    map_res(
        recognize(pair(
            opt(char('-')),
            take_while1(|c: char| c.is_ascii_digit()),
        )),
        |s: &str| s.parse::<i32>(),
    )(input)
}

/// Parse an unsigned integer literal (for parameter counts)
pub(crate) fn unsigned(input: &str) -> IResult<&str, usize> {
    map_res(take_while1(|c: char| c.is_ascii_digit()), |s: &str| {
        s.parse::<usize>()
    })(input)
}

/// Parse a temp (_T1, _T2, etc.)
pub(crate) fn parse_temp(input: &str) -> IResult<&str, Temp> {
    map(preceded(tag("_T"), integer), Temp::new)(input)
}

/// Parse a block label (.L1, loop_head, etc.)
pub(crate) fn parse_label(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '.'),
        |s: &str| s.to_string(),
    )(input)
}

/// Parse a function name (%name)
pub(crate) fn parse_function_name(input: &str) -> IResult<&str, String> {
    map(
        preceded(
            char('%'),
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
        ),
        |s: &str| s.to_string(),
    )(input)
}
