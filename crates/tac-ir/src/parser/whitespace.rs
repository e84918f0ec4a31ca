//! Whitespace parsing utilities.

use nom::{character::complete::multispace0, combinator::map, IResult};

/// Parse whitespace between instructions and blocks (spaces, tabs, newlines)
/// and discard it. Always succeeds.
pub(crate) fn blank(input: &str) -> IResult<&str, ()> {
    map(multispace0, |_| ())(input)
}
