use std::mem;

use crate::{
    ast::{Block, Expr, ForLoop, FunctionDef},
    error::SyntaxErrorKind,
    interpreter::{
        parser::{
            core::ParseResult,
            statement::parse_instructions,
            utils::{Terminators, error, find_enclosing, next_token_index, parse_separated},
        },
        token::{Token, TokenKind},
        value::number::Number,
    },
    util::stack::ensure_sufficient_stack,
};

/// Parses a block delimited by braces.
///
/// Grammar: `block := "{" instruction* "}"`
///
/// # Parameters
/// - `tokens`: The token slice.
/// - `open`: Index of the opening brace.
///
/// # Returns
/// The block and the index of the token after the closing brace.
pub fn parse_block(tokens: &[Token], open: usize) -> ParseResult<(Block, usize)> {
    let starter = &tokens[open];
    let close = find_enclosing(tokens, open + 1, starter)?;
    let body = ensure_sufficient_stack(|| parse_instructions(&tokens[open + 1..close]))?;

    Ok((Block { starter: starter.clone(),
                body },
        close + 1))
}

/// Parses a function definition.
///
/// ```text
/// definition := [alias] "def" identifier "(" [identifier ("," identifier)*] ")" block
/// ```
///
/// Line ends may appear anywhere in the parameter list and between the list
/// and the body.
///
/// # Parameters
/// - `tokens`: The token slice.
/// - `def`: Index of the `def` keyword.
/// - `alias`: The alias that preceded `def`, if any.
///
/// # Returns
/// The definition and the index of the token after its body.
///
/// # Errors
/// - `ExpectedFunctionName`, `ExpectedParameterList` or `ExpectedBody` when
///   a piece is missing.
/// - A comma error when parameters and commas do not alternate.
/// - `AliasArity` when a unary alias does not have exactly one parameter, or a
///   binary alias two.
pub fn parse_function_def(tokens: &[Token],
                          def: usize,
                          alias: Option<&Token>)
                          -> ParseResult<(FunctionDef, usize)> {
    let keyword = &tokens[def];
    let name = match tokens.get(def + 1) {
        Some(token) if token.identifier().is_some() => token,
        _ => return Err(error(SyntaxErrorKind::ExpectedFunctionName, keyword)),
    };

    let open = def + 2;
    let opener = match tokens.get(open) {
        Some(token) if token.kind == TokenKind::LParen => token,
        _ => return Err(error(SyntaxErrorKind::ExpectedParameterList, name)),
    };
    let close = find_enclosing(tokens, open + 1, opener)?;
    let params = parse_parameters(&tokens[open + 1..close], &tokens[close])?;

    let Some(body_open) = next_token_index(tokens, &TokenKind::LBrace, close + 1) else {
        return Err(error(SyntaxErrorKind::ExpectedBody("function"), &tokens[close]));
    };
    let (mut block, next) = parse_block(tokens, body_open)?;

    if let Some(alias) = alias {
        let expected = if matches!(alias.kind, TokenKind::UnaryAlias(_)) { 1 } else { 2 };
        if params.len() != expected {
            return Err(error(SyntaxErrorKind::AliasArity { alias: alias.to_string(),
                                                           expected,
                                                           found: params.len() },
                             keyword));
        }
    }

    Ok((FunctionDef { name: name.clone(),
                      alias: alias.cloned(),
                      params,
                      body: mem::take(&mut block.body) },
        next))
}

/// Reads the parameter names between the parentheses of a definition.
fn parse_parameters(list: &[Token], closing: &Token) -> ParseResult<Vec<Token>> {
    let mut params: Vec<Token> = Vec::new();
    let mut expecting_name = true;

    for token in list {
        match &token.kind {
            TokenKind::Eol => {},
            TokenKind::Comma if expecting_name && params.is_empty() => {
                return Err(error(SyntaxErrorKind::LeadingComma, token));
            },
            TokenKind::Comma if expecting_name => {
                return Err(error(SyntaxErrorKind::ConsecutiveCommas, token));
            },
            TokenKind::Comma => expecting_name = true,
            TokenKind::Identifier(_) if expecting_name => {
                params.push(token.clone());
                expecting_name = false;
            },
            TokenKind::Identifier(_) => return Err(error(SyntaxErrorKind::MissingComma, token)),
            _ if expecting_name => return Err(error(SyntaxErrorKind::ExpectedParameter, token)),
            _ => return Err(error(SyntaxErrorKind::MissingComma, token)),
        }
    }

    if expecting_name && !params.is_empty() {
        return Err(error(SyntaxErrorKind::TrailingComma, closing));
    }

    Ok(params)
}

/// Parses a `for` loop.
///
/// ```text
/// for_loop := "for" "(" parameters ")" block
/// parameters := end
///             | begin ":" end
///             | variable ":" begin ":" end
///             | variable ":" begin ":" end ":" step
/// ```
///
/// `begin` and `step` default to 1. The loop variable must be a bare
/// identifier.
///
/// # Parameters
/// - `tokens`: The token slice.
/// - `keyword`: Index of the `for` keyword.
///
/// # Returns
/// The loop and the index of the token after its body.
///
/// # Errors
/// - `ExpectedLoopParameters` or `ExpectedBody` when a piece is missing.
/// - `MissingLoopEnd` for empty parentheses, `TooManyLoopParameters` for more
///   than four parameters.
/// - `InvalidLoopVariable` when the first of three or four parameters is not
///   an identifier.
pub fn parse_for_loop(tokens: &[Token], keyword: usize) -> ParseResult<(ForLoop, usize)> {
    let for_token = &tokens[keyword];
    let Some(open) = next_token_index(tokens, &TokenKind::LParen, keyword + 1) else {
        return Err(error(SyntaxErrorKind::ExpectedLoopParameters, for_token));
    };
    let close = find_enclosing(tokens, open + 1, &tokens[open])?;
    let parameters = parse_separated(&tokens[open..close], Terminators::LOOP_PARAMETER)?;

    let count = parameters.len();
    if count > 4 {
        return Err(error(SyntaxErrorKind::TooManyLoopParameters(count - 4), for_token));
    }

    let mut parameters = parameters.into_iter();
    let var = if count >= 3 {
        match parameters.next().as_ref() {
            Some(Expr::Identifier(token)) => Some(token.clone()),
            _ => return Err(error(SyntaxErrorKind::InvalidLoopVariable, for_token)),
        }
    } else {
        None
    };
    let begin = if count >= 2 { parameters.next() } else { None };
    let Some(end) = parameters.next() else {
        return Err(error(SyntaxErrorKind::MissingLoopEnd, for_token));
    };
    let step = parameters.next();

    let one = || Expr::Number(Token::synthesize_number(Number::from(1), &tokens[open]));

    let Some(body_open) = next_token_index(tokens, &TokenKind::LBrace, close + 1) else {
        return Err(error(SyntaxErrorKind::ExpectedBody("for loop"), &tokens[close]));
    };
    let (mut block, next) = parse_block(tokens, body_open)?;

    Ok((ForLoop { keyword: for_token.clone(),
                  var,
                  begin: begin.unwrap_or_else(one),
                  end,
                  step: step.unwrap_or_else(one),
                  starter: block.starter.clone(),
                  body: mem::take(&mut block.body) },
        next))
}
