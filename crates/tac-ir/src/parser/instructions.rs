//! Instruction parser.

use alloc::string::ToString;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till},
    character::complete::{char, space0, space1},
    combinator::{map, opt},
    multi::separated_list0,
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};

use super::primitives::{integer, parse_function_name, parse_label, parse_temp};
use crate::inst::{BinaryOp, TacInst, UnaryOp};

/// Parse a binary operator symbol. Two-character symbols come first so that
/// `<=` is not read as `<` followed by junk.
fn parse_binary_op(input: &str) -> IResult<&str, BinaryOp> {
    alt((
        map(tag("=="), |_| BinaryOp::Equ),
        map(tag("!="), |_| BinaryOp::Neq),
        map(tag("<="), |_| BinaryOp::Leq),
        map(tag(">="), |_| BinaryOp::Geq),
        map(tag("&&"), |_| BinaryOp::And),
        map(tag("||"), |_| BinaryOp::Or),
        map(char('<'), |_| BinaryOp::Slt),
        map(char('>'), |_| BinaryOp::Sgt),
        map(char('+'), |_| BinaryOp::Add),
        map(char('-'), |_| BinaryOp::Sub),
        map(char('*'), |_| BinaryOp::Mul),
        map(char('/'), |_| BinaryOp::Div),
        map(char('%'), |_| BinaryOp::Rem),
    ))(input)
}

fn parse_unary_op(input: &str) -> IResult<&str, UnaryOp> {
    alt((
        map(tag("neg"), |_| UnaryOp::Neg),
        map(tag("not"), |_| UnaryOp::Not),
        map(tag("seqz"), |_| UnaryOp::Seqz),
    ))(input)
}

/// Parse a comment instruction: `# text` (to end of line)
fn parse_comment(input: &str) -> IResult<&str, TacInst> {
    map(
        preceded(char('#'), take_till(|c| c == '\n')),
        |text: &str| TacInst::Comment(text.trim().to_string()),
    )(input)
}

/// Parse a jump: `jump .L2`
fn parse_jump(input: &str) -> IResult<&str, TacInst> {
    map(
        preceded(terminated(tag("jump"), space1), parse_label),
        |target| TacInst::Jump { target },
    )(input)
}

/// Parse a branch: `br _T1, .L1, .L2` (false target first)
fn parse_branch(input: &str) -> IResult<&str, TacInst> {
    map(
        tuple((
            terminated(tag("br"), space1),
            terminated(parse_temp, tuple((space0, char(','), space0))),
            terminated(parse_label, tuple((space0, char(','), space0))),
            parse_label,
        )),
        |(_, cond, false_target, true_target)| TacInst::Branch {
            cond,
            false_target,
            true_target,
        },
    )(input)
}

/// Parse a return: `return` or `return _T1`
///
/// The gap before the value must not cross a newline, otherwise a bare
/// `return` would swallow the temp starting the next line.
fn parse_return(input: &str) -> IResult<&str, TacInst> {
    map(
        preceded(tag("return"), opt(preceded(space1, parse_temp))),
        |value| TacInst::Return { value },
    )(input)
}

/// Parse the right-hand side of `dst = (src1 op src2)`
fn parse_binary_rhs(input: &str) -> IResult<&str, (BinaryOp, crate::Temp, crate::Temp)> {
    map(
        delimited(
            terminated(char('('), space0),
            tuple((
                terminated(parse_temp, space0),
                terminated(parse_binary_op, space0),
                terminated(parse_temp, space0),
            )),
            char(')'),
        ),
        |(src1, op, src2)| (op, src1, src2),
    )(input)
}

/// Parse the right-hand side of `dst = call %f(_T1, _T2)`
fn parse_call_rhs(input: &str) -> IResult<&str, (alloc::string::String, alloc::vec::Vec<crate::Temp>)> {
    tuple((
        preceded(terminated(tag("call"), space1), parse_function_name),
        delimited(
            terminated(char('('), space0),
            separated_list0(
                terminated(char(','), space0),
                terminated(parse_temp, space0),
            ),
            char(')'),
        ),
    ))(input)
}

/// Parse an assignment-form instruction: `dst = <rhs>`
fn parse_assign_form(input: &str) -> IResult<&str, TacInst> {
    let (input, dst) = terminated(parse_temp, tuple((space0, char('='), space0)))(input)?;
    alt((
        map(parse_binary_rhs, move |(op, src1, src2)| TacInst::Binary {
            op,
            dst,
            src1,
            src2,
        }),
        map(parse_call_rhs, move |(callee, args)| TacInst::Call {
            callee,
            dst,
            args,
        }),
        map(
            tuple((parse_unary_op, space1, parse_temp)),
            move |(op, _, src)| TacInst::Unary { op, dst, src },
        ),
        map(parse_temp, move |src| TacInst::Assign { dst, src }),
        map(integer, move |value| TacInst::LoadImm32 { dst, value }),
    ))(input)
}

/// Parse a single instruction.
pub(crate) fn parse_instruction(input: &str) -> IResult<&str, TacInst> {
    alt((
        parse_comment,
        parse_jump,
        parse_branch,
        parse_return,
        parse_assign_form,
    ))(input)
}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec};

    use super::*;
    use crate::Temp;

    #[test]
    fn test_parse_load_imm() {
        let (rest, inst) = parse_instruction("_T1 = 42").unwrap();
        assert_eq!(rest, "");
        assert_eq!(
            inst,
            TacInst::LoadImm32 {
                dst: Temp::new(1),
                value: 42
            }
        );
    }

    #[test]
    fn test_parse_negative_imm() {
        let (_, inst) = parse_instruction("_T1 = -7").unwrap();
        assert_eq!(
            inst,
            TacInst::LoadImm32 {
                dst: Temp::new(1),
                value: -7
            }
        );
    }

    #[test]
    fn test_parse_assign() {
        let (_, inst) = parse_instruction("_T2 = _T1").unwrap();
        assert_eq!(
            inst,
            TacInst::Assign {
                dst: Temp::new(2),
                src: Temp::new(1)
            }
        );
    }

    #[test]
    fn test_parse_unary() {
        let (_, inst) = parse_instruction("_T2 = neg _T1").unwrap();
        assert_eq!(
            inst,
            TacInst::Unary {
                op: UnaryOp::Neg,
                dst: Temp::new(2),
                src: Temp::new(1)
            }
        );
    }

    #[test]
    fn test_parse_binary() {
        let (_, inst) = parse_instruction("_T3 = (_T1 <= _T2)").unwrap();
        assert_eq!(
            inst,
            TacInst::Binary {
                op: BinaryOp::Leq,
                dst: Temp::new(3),
                src1: Temp::new(1),
                src2: Temp::new(2)
            }
        );
    }

    #[test]
    fn test_parse_jump() {
        let (_, inst) = parse_instruction("jump .L2").unwrap();
        assert_eq!(
            inst,
            TacInst::Jump {
                target: ".L2".to_string()
            }
        );
    }

    #[test]
    fn test_parse_branch() {
        let (_, inst) = parse_instruction("br _T1, .L1, .L2").unwrap();
        assert_eq!(
            inst,
            TacInst::Branch {
                cond: Temp::new(1),
                false_target: ".L1".to_string(),
                true_target: ".L2".to_string()
            }
        );
    }

    #[test]
    fn test_parse_return() {
        assert_eq!(
            parse_instruction("return").unwrap().1,
            TacInst::Return { value: None }
        );
        assert_eq!(
            parse_instruction("return _T1").unwrap().1,
            TacInst::Return {
                value: Some(Temp::new(1))
            }
        );
    }

    #[test]
    fn test_parse_return_does_not_cross_lines() {
        // A bare return followed by an assignment on the next line must not
        // consume the next line's temp as its value.
        let (rest, inst) = parse_instruction("return\n_T1 = 2").unwrap();
        assert_eq!(inst, TacInst::Return { value: None });
        assert_eq!(rest, "\n_T1 = 2");
    }

    #[test]
    fn test_parse_call() {
        let (_, inst) = parse_instruction("_T3 = call %f(_T1, _T2)").unwrap();
        assert_eq!(
            inst,
            TacInst::Call {
                callee: "f".to_string(),
                dst: Temp::new(3),
                args: vec![Temp::new(1), Temp::new(2)]
            }
        );
    }

    #[test]
    fn test_parse_call_no_args() {
        let (_, inst) = parse_instruction("_T1 = call %getint()").unwrap();
        assert_eq!(
            inst,
            TacInst::Call {
                callee: "getint".to_string(),
                dst: Temp::new(1),
                args: vec![]
            }
        );
    }

    #[test]
    fn test_parse_comment() {
        let (_, inst) = parse_instruction("# loop header").unwrap();
        assert_eq!(inst, TacInst::Comment("loop header".to_string()));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_instruction("= 42").is_err());
        assert!(parse_instruction("_T1 = (42 + _T2)").is_err());
    }
}
