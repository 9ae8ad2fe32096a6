use std::rc::Rc;

use crate::{
    ast::Instruction,
    error::SyntaxErrorKind,
    interpreter::{
        parser::{
            binary::parse_value_expression,
            block::{parse_block, parse_for_loop, parse_function_def},
            core::ParseResult,
            unary::parse_call,
            utils::{Terminators, error, next_token_index},
        },
        token::{Token, TokenKind},
    },
};

/// Parses a sequence of instructions.
///
/// Line ends and semicolons between instructions are skipped. Each
/// instruction starts with one of:
///
/// - `ext`: an assignment to a variable of an enclosing scope.
/// - an identifier: an assignment, or a call whose result is discarded.
/// - `def`, or an alias followed by `def`: a function definition.
/// - `{`: an anonymous function.
/// - `ret`: a return, with or without a value.
/// - `for`: a loop.
///
/// # Parameters
/// - `tokens`: The instructions, without the enclosing braces or sentinels.
///
/// # Returns
/// The parsed instructions, in source order.
///
/// # Errors
/// `CannotStartInstruction` for any other token, plus the errors of each
/// construct.
pub fn parse_instructions(tokens: &[Token]) -> ParseResult<Vec<Instruction>> {
    let mut instructions = Vec::new();
    let mut index = 0;

    while let Some(token) = tokens.get(index) {
        let (instruction, next) = match &token.kind {
            TokenKind::Eol | TokenKind::Semicolon => {
                index += 1;
                continue;
            },
            TokenKind::Ext => parse_ext(tokens, index)?,
            TokenKind::Identifier(_) => parse_identifier_statement(tokens, index)?,
            TokenKind::Def => {
                let (def, next) = parse_function_def(tokens, index, None)?;
                (Instruction::FunctionDef(Rc::new(def)), next)
            },
            TokenKind::UnaryAlias(_) | TokenKind::BinaryAlias(_) => {
                let Some(def) = next_token_index(tokens, &TokenKind::Def, index + 1) else {
                    return Err(error(SyntaxErrorKind::AliasWithoutDefinition, token));
                };
                let (def, next) = parse_function_def(tokens, def, Some(token))?;
                (Instruction::FunctionDef(Rc::new(def)), next)
            },
            TokenKind::LBrace => {
                let (block, next) = parse_block(tokens, index)?;
                (Instruction::AnonymousFunction(block), next)
            },
            TokenKind::Ret => parse_return(tokens, index)?,
            TokenKind::For => {
                let (for_loop, next) = parse_for_loop(tokens, index)?;
                (Instruction::ForLoop(Box::new(for_loop)), next)
            },
            _ => return Err(error(SyntaxErrorKind::CannotStartInstruction(token.to_string()), token)),
        };

        instructions.push(instruction);
        index = next;
    }

    Ok(instructions)
}

/// `ext name = value`
fn parse_ext(tokens: &[Token], ext: usize) -> ParseResult<(Instruction, usize)> {
    let var = match tokens.get(ext + 1) {
        Some(token) if token.identifier().is_some() => token,
        _ => return Err(error(SyntaxErrorKind::ExpectedExtName, &tokens[ext])),
    };
    let assign = match tokens.get(ext + 2) {
        Some(token) if token.kind == TokenKind::Assign => token,
        _ => return Err(error(SyntaxErrorKind::ExpectedAssign(var.to_string()), var)),
    };
    let (value, next) = parse_value_expression(tokens, assign, ext + 3, Terminators::STATEMENT)?;

    Ok((Instruction::Assign { ext: true,
                              var: var.clone(),
                              value },
        next))
}

/// `name = value` or `name(arguments)`
fn parse_identifier_statement(tokens: &[Token], name: usize) -> ParseResult<(Instruction, usize)> {
    let var = &tokens[name];
    let Some(next) = tokens.get(name + 1) else {
        return Err(error(SyntaxErrorKind::DanglingIdentifier, var));
    };

    match next.kind {
        TokenKind::Assign => {
            let (value, end) = parse_value_expression(tokens, next, name + 2, Terminators::STATEMENT)?;
            Ok((Instruction::Assign { ext: false,
                                      var: var.clone(),
                                      value },
                end))
        },
        TokenKind::LParen => {
            let (call, end) = parse_call(tokens, name)?;
            Ok((Instruction::Call(call), end))
        },
        _ => Err(error(SyntaxErrorKind::UnexpectedAfterIdentifier(next.to_string()), next)),
    }
}

/// `ret` or `ret value`
fn parse_return(tokens: &[Token], ret: usize) -> ParseResult<(Instruction, usize)> {
    let keyword = &tokens[ret];
    let bare = tokens.get(ret + 1)
                     .is_none_or(|next| matches!(next.kind, TokenKind::Eol | TokenKind::Semicolon));
    if bare {
        return Ok((Instruction::Return { keyword: keyword.clone(),
                                         value:   None, },
                   ret + 1));
    }

    let (value, next) = parse_value_expression(tokens, keyword, ret + 1, Terminators::STATEMENT)?;
    Ok((Instruction::Return { keyword: keyword.clone(),
                              value:   Some(value), },
        next))
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::lexer::tokenize_source;

    fn parse(source: &str) -> ParseResult<Vec<String>> {
        let tokens = tokenize_source(PathBuf::from("test.mlg"), source.into(), Path::new("std_libs")).unwrap();
        let content = &tokens[1..tokens.len() - 1];
        parse_instructions(content).map(|instructions| instructions.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn instruction_kinds() {
        let source = "x = 1; y = x * 2\n\
                      ext x = y\n\
                      print(x)\n\
                      $neg def negate(a) { ret 0 - a }\n\
                      { z = 3 }\n\
                      for(i : 1 : 3) { x = x + i }\n\
                      ret\n\
                      ret x";
        assert_eq!(parse(source).unwrap(),
                   ["x = 1",
                    "y = x * 2",
                    "ext x = y",
                    "print(x)",
                    "$neg def negate(a) { 1 instruction(s) }",
                    "{ 1 instruction(s) }",
                    "for(i: 1 : 3 : 1) { 1 instruction(s) }",
                    "ret",
                    "ret x"]);
    }

    #[test]
    fn alias_may_sit_on_its_own_line() {
        assert_eq!(parse("@plus\ndef add(a, b) { ret a + b }").unwrap(),
                   ["@plus def add(a, b) { 1 instruction(s) }"]);
    }

    #[test]
    fn instruction_errors() {
        let kind = |source| parse(source).unwrap_err().kind;
        assert_eq!(kind("{ x }"), SyntaxErrorKind::DanglingIdentifier);
        assert_eq!(kind("x + 1"), SyntaxErrorKind::UnexpectedAfterIdentifier("+".into()));
        assert_eq!(kind("ext 1 = 2"), SyntaxErrorKind::ExpectedExtName);
        assert_eq!(kind("ext x 2"), SyntaxErrorKind::ExpectedAssign("x".into()));
        assert_eq!(kind("$neg x = 1"), SyntaxErrorKind::AliasWithoutDefinition);
        assert_eq!(kind("3 + 4"), SyntaxErrorKind::CannotStartInstruction("3".into()));
        assert_eq!(kind("}"), SyntaxErrorKind::CannotStartInstruction("}".into()));
        assert_eq!(kind("x = 1 2"), SyntaxErrorKind::UnexpectedInExpression("2".into()));
    }
}
