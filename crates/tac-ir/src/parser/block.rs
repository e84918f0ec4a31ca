//! Block parser.

use nom::{
    character::complete::char,
    multi::many0,
    sequence::terminated,
    IResult,
};

use super::{
    instructions::parse_instruction,
    primitives::parse_label,
    whitespace::blank,
};
use crate::block::TacBlock;

/// Parse a block: a `label:` line followed by instructions.
///
/// `many0` stops at the first thing that is not an instruction, which is
/// either the next block's label line or the function's closing brace.
pub(crate) fn parse_block(input: &str) -> IResult<&str, TacBlock> {
    let (input, _) = blank(input)?;
    let (input, label) = parse_label(input)?;
    let (input, _) = terminated(char(':'), blank)(input)?;

    let (input, instrs) = many0(terminated(parse_instruction, blank))(input)?;

    Ok((input, TacBlock { label, instrs }))
}
