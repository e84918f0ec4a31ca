//! Parser for the textual TAC form.

mod block;
mod error;
mod function;
mod instructions;
mod primitives;
mod whitespace;

use nom::{multi::many1, sequence::terminated, IResult};

use error::parse_error;
pub use error::ParseError;
use function::parse_function_internal;
use whitespace::blank;

use crate::{function::TacFunc, program::TacProg};

fn parse_program_internal(input: &str) -> IResult<&str, TacProg> {
    let (input, _) = blank(input)?;
    let (input, funcs) = many1(terminated(parse_function_internal, blank))(input)?;
    Ok((input, TacProg { funcs }))
}

/// Parse a complete program from TAC text.
pub fn parse_program(input: &str) -> Result<TacProg, ParseError> {
    let trimmed = input.trim();
    match parse_program_internal(trimmed) {
        Ok(("", prog)) => Ok(prog),
        Ok((remaining, prog)) => {
            if remaining.trim().is_empty() {
                Ok(prog)
            } else {
                Err(parse_error(
                    trimmed,
                    remaining,
                    &alloc::format!("Unexpected input remaining: {}", remaining),
                ))
            }
        }
        Err(e) => Err(parse_error(
            trimmed,
            trimmed,
            &alloc::format!("Parse error: {:?}", e),
        )),
    }
}

/// Parse a single function from TAC text.
pub fn parse_function(input: &str) -> Result<TacFunc, ParseError> {
    let trimmed = input.trim();
    match parse_function_internal(trimmed) {
        Ok(("", func)) => Ok(func),
        Ok((remaining, func)) => {
            if remaining.trim().is_empty() {
                Ok(func)
            } else {
                Err(parse_error(
                    trimmed,
                    remaining,
                    &alloc::format!("Unexpected input remaining: {}", remaining),
                ))
            }
        }
        Err(e) => Err(parse_error(
            trimmed,
            trimmed,
            &alloc::format!("Parse error: {:?}", e),
        )),
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn test_parse_program_empty() {
        assert!(parse_program("").is_err(), "Should fail on empty input");
    }

    #[test]
    fn test_parse_program_invalid_syntax() {
        assert!(parse_program("invalid").is_err());
    }

    #[test]
    fn test_parse_program_trailing_garbage() {
        let input = "function %main(0) {\n.L1:\n    return\n} extra";
        assert!(parse_program(input).is_err());
    }

    #[test]
    fn test_parse_program_two_functions() {
        let input = r#"
function %helper(1) {
.L1:
    _T2 = (_T1 + _T1)
    return _T2
}

function %main(0) {
.L2:
    _T1 = 21
    _T2 = call %helper(_T1)
    return _T2
}"#;
        let prog = parse_program(input).expect("program should parse");
        assert_eq!(prog.funcs.len(), 2);
        assert_eq!(prog.funcs[0].name, "helper");
        assert_eq!(prog.funcs[1].name, "main");
    }

    #[test]
    fn test_parse_program_with_comments() {
        let input = r#"
function %main(0) {
.L1:
    # constant
    _T1 = 42
    return _T1
}"#;
        let prog = parse_program(input).expect("program should parse");
        assert_eq!(prog.funcs[0].blocks[0].instrs.len(), 3);
    }

    #[test]
    fn test_display_round_trip() {
        let input = r#"
function %main(0) {
.L1:
    _T1 = 10
    _T2 = 3
    _T3 = (_T1 % _T2)
    _T4 = seqz _T3
    br _T4, .L2, .L3
.L2:
    return _T3
.L3:
    return _T4
}"#;
        let prog = parse_program(input).expect("program should parse");
        let reparsed = parse_program(&prog.to_string()).expect("printed form should re-parse");
        assert_eq!(prog, reparsed);
    }

    #[test]
    fn test_parse_error_display() {
        let err = parse_program("function %f(0) {").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Parse error"));
    }
}
