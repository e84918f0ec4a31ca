//! Function parser.

use nom::{
    bytes::complete::tag,
    character::complete::char,
    multi::many1,
    sequence::{delimited, terminated},
    IResult,
};

use super::{
    block::parse_block,
    primitives::{parse_function_name, unsigned},
    whitespace::blank,
};
use crate::function::TacFunc;

/// Parse a function (internal, used by the program parser).
///
/// ```text
/// function %name(2) {
/// .L1:
///     ...
/// }
/// ```
///
/// The parenthesised integer is the parameter count. The function's temp
/// counter is primed past every temp index occurring in the body, so temps
/// minted later never collide with parsed ones.
pub(crate) fn parse_function_internal(input: &str) -> IResult<&str, TacFunc> {
    let (input, _) = terminated(tag("function"), blank)(input)?;
    let (input, name) = terminated(parse_function_name, blank)(input)?;
    let (input, num_params) = delimited(
        terminated(char('('), blank),
        terminated(unsigned, blank),
        terminated(char(')'), blank),
    )(input)?;
    let (input, _) = terminated(char('{'), blank)(input)?;

    let (input, blocks) = many1(parse_block)(input)?;

    let (input, _) = terminated(char('}'), blank)(input)?;

    let mut func = TacFunc::new(name, num_params);
    func.blocks = blocks;
    for block in &func.blocks {
        for inst in &block.instrs {
            for temp in inst.defs().iter().chain(inst.uses().iter()) {
                if temp.index() > func.temp_used {
                    func.temp_used = temp.index();
                }
            }
        }
    }
    Ok((input, func))
}
