use std::{
    collections::HashSet,
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use logos::Logos;
use num_bigint::BigInt;
use num_traits::Zero;
use tracing::{debug, trace};

use crate::{
    error::{Error, LexError, LexErrorKind},
    interpreter::{
        token::{Location, SourceFile, Token, TokenKind},
        value::{number::Number, operation::Operator},
    },
    util::stack::ensure_sufficient_stack,
};

/// Extension of Malang source files, appended when a path is not found as
/// written.
pub const SOURCE_EXTENSION: &str = "mlg";

/// The raw lexemes recognised by `logos`.
///
/// Newlines and `include` directives are handled by the driver in
/// [`tokenize_source`], which also attaches locations and converts the rest to
/// [`TokenKind`].
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(extras = LexerExtras)]
#[logos(error = LexErrorKind)]
enum RawToken {
    /// Numeric literals such as `3`, `-2.5` or `1_000`. A `-` directly
    /// followed by a digit belongs to the number.
    #[regex(r"-?[0-9][0-9._]*", parse_number)]
    /// String literals, packed into one integer.
    #[regex(r#""([^"\\\n]|\\.)*""#, parse_string, allow_greedy = true)]
    #[regex(r#""([^"\\\n]|\\.)*\\?"#, unterminated_string, allow_greedy = true)]
    /// Character literals, lowered to their code point.
    #[regex(r"'([^'\\\n]|\\.)*'", parse_char, allow_greedy = true)]
    #[regex(r"'([^'\\\n]|\\.)*\\?", unterminated_character, allow_greedy = true)]
    Number(Number),
    #[token("+", |_| Operator::Add)]
    #[token("-", |_| Operator::Sub)]
    #[token("*", |_| Operator::Mul)]
    #[token("/", |_| Operator::Div)]
    #[token("//", |_| Operator::IntDiv)]
    #[token("^", |_| Operator::Pow)]
    Operator(Operator),
    /// `def`
    #[token("def")]
    Def,
    /// `ext`
    #[token("ext")]
    Ext,
    /// `ret`
    #[token("ret")]
    Ret,
    /// `for`
    #[token("for")]
    For,
    /// `include`
    #[token("include")]
    Include,
    #[regex(r"[_A-Za-z][_A-Za-z0-9]*", |lex| Rc::<str>::from(lex.slice()))]
    Identifier(Rc<str>),
    /// `$name`, up to the next whitespace.
    #[regex(r"\$[^ \t\r\n\f]*", |lex| Rc::<str>::from(&lex.slice()[1..]), allow_greedy = true)]
    UnaryAlias(Rc<str>),
    /// `@name`, up to the next whitespace.
    #[regex(r"@[^ \t\r\n\f]*", |lex| Rc::<str>::from(&lex.slice()[1..]), allow_greedy = true)]
    BinaryAlias(Rc<str>),
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `=`
    #[token("=")]
    Assign,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `:`
    #[token(":")]
    Colon,
    /// `# Comments.`
    #[regex(r"#[^\n]*", logos::skip, allow_greedy = true)]
    Comment,
    /// Spaces, tabs, carriage returns and feeds.
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Ignored,
    #[token("\n")]
    NewLine,
}

/// Position bookkeeping carried by the lexer.
#[derive(Default)]
pub struct LexerExtras {
    /// The current 1-based line.
    pub line:       usize,
    /// Byte offset at which the current line starts.
    pub line_start: usize,
}

fn parse_number(lex: &logos::Lexer<RawToken>) -> Result<Number, LexErrorKind> {
    Number::parse_literal(lex.slice()).ok_or_else(|| LexErrorKind::InvalidNumber(lex.slice().to_string()))
}

fn unterminated_string(_: &logos::Lexer<RawToken>) -> Result<Number, LexErrorKind> {
    Err(LexErrorKind::UnterminatedString)
}

fn unterminated_character(_: &logos::Lexer<RawToken>) -> Result<Number, LexErrorKind> {
    Err(LexErrorKind::UnterminatedCharacter)
}

/// Packs a string literal into a single integer, each character being one
/// base-256 digit, most significant first.
fn parse_string(lex: &logos::Lexer<RawToken>) -> Result<Number, LexErrorKind> {
    let slice = lex.slice();
    let text = unescape(&slice[1..slice.len() - 1])?;
    if text.is_empty() {
        return Err(LexErrorKind::EmptyString);
    }

    let packed = text.chars()
                     .fold(BigInt::zero(), |acc, c| (acc << 8u8) + u32::from(c));
    Ok(Number::Integer(packed))
}

fn parse_char(lex: &logos::Lexer<RawToken>) -> Result<Number, LexErrorKind> {
    let slice = lex.slice();
    let text = unescape(&slice[1..slice.len() - 1])?;
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Number::from(BigInt::from(u32::from(c)))),
        _ => Err(LexErrorKind::InvalidCharacter),
    }
}

/// Resolves the escape sequences of a literal body.
///
/// # Example
/// ```text
/// unescape(r"a\tb") == Ok("a\tb")
/// unescape(r"\q")   == Err(UnknownEscape('q'))
/// ```
fn unescape(body: &str) -> Result<String, LexErrorKind> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = match chars.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('b') => '\u{8}',
            Some('a') => '\u{7}',
            Some('0') => '\0',
            Some(c @ ('\\' | '"' | '\'')) => c,
            Some(other) => return Err(LexErrorKind::UnknownEscape(other)),
            None => return Err(LexErrorKind::UnterminatedString),
        };
        out.push(escaped);
    }
    Ok(out)
}

/// Reads the entry file and lexes it along with everything it includes.
///
/// The path is tried as written, then with the `.mlg` extension appended.
///
/// # Errors
/// [`Error::MissingFile`] if the entry file cannot be read, otherwise any
/// error of [`tokenize_source`].
pub fn tokenize_file(path: &Path, std_lib_dir: &Path) -> Result<Vec<Token>, Error> {
    let (path, text) = read_entry_file(path)?;
    tokenize_source(path, text, std_lib_dir)
}

/// Lexes `text` as the main file located at `path`.
///
/// The stream starts with [`TokenKind::Boc`] and ends with
/// [`TokenKind::Eoc`]. Every source line, blank ones included, ends with a
/// [`TokenKind::Eol`]. `include` directives are resolved on the spot and the
/// included tokens spliced in place, without sentinels; each file is spliced
/// at most once.
///
/// # Errors
/// A [`LexError`] for malformed input, or [`Error::NoSuchFile`] for an
/// `include` that cannot be resolved.
///
/// # Example
/// ```
/// use std::path::{Path, PathBuf};
///
/// use malang::interpreter::lexer::tokenize_source;
///
/// let tokens = tokenize_source(PathBuf::from("a.mlg"), "x = 1".into(), Path::new("std_libs")).unwrap();
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind.to_string()).collect();
/// assert_eq!(kinds, ["beginning of content", "x", "=", "1", "end of line", "end of content"]);
/// ```
pub fn tokenize_source(path: PathBuf, text: String, std_lib_dir: &Path) -> Result<Vec<Token>, Error> {
    let main_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut includes = Includes { main_dir,
                                  std_lib_dir,
                                  seen: HashSet::from([canonical(&path)]) };

    let file = Rc::new(SourceFile::new(path, text));
    let mut tokens = vec![Token::new(TokenKind::Boc,
                                     Location { file:   Rc::clone(&file),
                                                line:   1,
                                                column: 1,
                                                span:   0, })];
    includes.tokenize_into(&file, &mut tokens)?;
    tokens.push(Token::new(TokenKind::Eoc, end_of_content(&file)));

    debug!(file = %file.path().display(), tokens = tokens.len(), "tokenized");
    Ok(tokens)
}

fn read_entry_file(path: &Path) -> Result<(PathBuf, String), Error> {
    let mut candidates = vec![path.to_path_buf()];
    if path.extension().is_none_or(|ext| ext != SOURCE_EXTENSION) {
        let mut with_extension = OsString::from(path.as_os_str());
        with_extension.push(".");
        with_extension.push(SOURCE_EXTENSION);
        candidates.push(PathBuf::from(with_extension));
    }

    candidates.into_iter()
              .find_map(|candidate| fs::read_to_string(&candidate).ok().map(|text| (candidate, text)))
              .ok_or_else(|| Error::MissingFile { path: path.to_path_buf() })
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn end_of_content(file: &Rc<SourceFile>) -> Location {
    let line = file.text().lines().count().max(1);
    Location { file: Rc::clone(file),
               line,
               column: file.line(line).chars().count() + 1,
               span: 0 }
}

/// Include resolution state for one run.
struct Includes<'a> {
    main_dir:    PathBuf,
    std_lib_dir: &'a Path,
    /// Canonical paths already spliced, the main file included.
    seen:        HashSet<PathBuf>,
}

impl Includes<'_> {
    fn tokenize_into(&mut self, file: &Rc<SourceFile>, tokens: &mut Vec<Token>) -> Result<(), Error> {
        let text = file.text();
        let mut lexer = RawToken::lexer_with_extras(text, LexerExtras { line:       1,
                                                                        line_start: 0, });

        while let Some(raw) = lexer.next() {
            let location = locate(file, &lexer);
            let kind = match raw {
                Ok(RawToken::NewLine) => {
                    tokens.push(Token::new(TokenKind::Eol, location));
                    lexer.extras.line += 1;
                    lexer.extras.line_start = lexer.span().end;
                    continue;
                },
                Ok(RawToken::Include) => {
                    let rest = lexer.remainder();
                    let end = rest.find('\n').unwrap_or(rest.len());
                    let directive = &rest[..end];
                    let requested = directive.split('#').next().unwrap_or_default();
                    let location = Location { span: location.span
                                                    + directive.trim_end().chars().count(),
                                              ..location };
                    for path in requested.split(',').map(str::trim) {
                        self.include(path, &location, tokens)?;
                    }
                    lexer.bump(end);
                    continue;
                },
                Ok(RawToken::Comment | RawToken::Ignored) => continue,
                Ok(RawToken::Number(n)) => TokenKind::Number(n),
                Ok(RawToken::Operator(op)) => TokenKind::Operator(op),
                Ok(RawToken::Identifier(name)) => TokenKind::Identifier(name),
                Ok(RawToken::UnaryAlias(name)) => TokenKind::UnaryAlias(name),
                Ok(RawToken::BinaryAlias(name)) => TokenKind::BinaryAlias(name),
                Ok(RawToken::Def) => TokenKind::Def,
                Ok(RawToken::Ext) => TokenKind::Ext,
                Ok(RawToken::Ret) => TokenKind::Ret,
                Ok(RawToken::For) => TokenKind::For,
                Ok(RawToken::LParen) => TokenKind::LParen,
                Ok(RawToken::RParen) => TokenKind::RParen,
                Ok(RawToken::LBrace) => TokenKind::LBrace,
                Ok(RawToken::RBrace) => TokenKind::RBrace,
                Ok(RawToken::Assign) => TokenKind::Assign,
                Ok(RawToken::Comma) => TokenKind::Comma,
                Ok(RawToken::Semicolon) => TokenKind::Semicolon,
                Ok(RawToken::Colon) => TokenKind::Colon,
                Err(kind) => return Err(LexError { kind, location }.into()),
            };
            tokens.push(Token::new(kind, location));
        }

        if !text.is_empty() && !text.ends_with('\n') {
            let line = lexer.extras.line;
            tokens.push(Token::new(TokenKind::Eol,
                                   Location { file: Rc::clone(file),
                                              line,
                                              column: file.line(line).chars().count() + 1,
                                              span: 1 }));
        }

        Ok(())
    }

    fn include(&mut self, requested: &str, location: &Location, tokens: &mut Vec<Token>) -> Result<(), Error> {
        let Some((path, text)) = self.resolve(requested) else {
            return Err(Error::NoSuchFile { path:     requested.to_string(),
                                           location: location.clone(), });
        };
        if !self.seen.insert(canonical(&path)) {
            trace!(path = %path.display(), "already included");
            return Ok(());
        }

        debug!(path = %path.display(), "including");
        let file = Rc::new(SourceFile::new(path, text));
        ensure_sufficient_stack(|| self.tokenize_into(&file, tokens))
    }

    /// Looks next to the main file, then in the standard library directory,
    /// then does both again with the extension appended.
    fn resolve(&self, requested: &str) -> Option<(PathBuf, String)> {
        let mut candidate = requested.to_string();
        loop {
            for dir in [self.main_dir.as_path(), self.std_lib_dir] {
                let path = dir.join(&candidate);
                if let Ok(text) = fs::read_to_string(&path) {
                    return Some((path, text));
                }
            }
            if candidate.ends_with(&format!(".{SOURCE_EXTENSION}")) {
                return None;
            }
            candidate.push('.');
            candidate.push_str(SOURCE_EXTENSION);
        }
    }
}

fn locate(file: &Rc<SourceFile>, lexer: &logos::Lexer<RawToken>) -> Location {
    let start = lexer.span().start;
    let before = file.text().get(lexer.extras.line_start..start).unwrap_or_default();

    Location { file:   Rc::clone(file),
               line:   lexer.extras.line,
               column: before.chars().count() + 1,
               span:   lexer.slice().chars().count(), }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(text: &str) -> Result<Vec<Token>, Error> {
        tokenize_source(PathBuf::from("test.mlg"), text.to_string(), Path::new("std_libs"))
    }

    fn kinds(text: &str) -> Vec<TokenKind> {
        lex(text).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn lex_error(text: &str) -> LexErrorKind {
        match lex(text) {
            Err(Error::Lex(error)) => error.kind,
            other => panic!("expected a lexical error, got {other:?}"),
        }
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Identifier(name.into())
    }

    fn num(n: i64) -> TokenKind {
        TokenKind::Number(Number::from(n))
    }

    #[test]
    fn statement_tokens() {
        use TokenKind::{Assign, Boc, Eoc, Eol, Operator as Op};

        assert_eq!(kinds("x = 1_000 + -2 // 3"),
                   vec![Boc,
                        ident("x"),
                        Assign,
                        num(1000),
                        Op(Operator::Add),
                        num(-2),
                        Op(Operator::IntDiv),
                        num(3),
                        Eol,
                        Eoc]);
    }

    #[test]
    fn keywords_and_punctuation() {
        use TokenKind::*;

        assert_eq!(kinds("def f(a, b) { ret a }; ext y = 2: for"),
                   vec![Boc,
                        Def,
                        ident("f"),
                        LParen,
                        ident("a"),
                        Comma,
                        ident("b"),
                        RParen,
                        LBrace,
                        Ret,
                        ident("a"),
                        RBrace,
                        Semicolon,
                        Ext,
                        ident("y"),
                        Assign,
                        num(2),
                        Colon,
                        For,
                        Eol,
                        Eoc]);
    }

    #[test]
    fn every_line_ends_with_eol() {
        let tokens = kinds("a = 1\n\n# only a comment\r\nb = 2\n");
        let eols = tokens.iter().filter(|k| **k == TokenKind::Eol).count();
        assert_eq!(eols, 4);
        assert_eq!(kinds(""), vec![TokenKind::Boc, TokenKind::Eoc]);
    }

    #[test]
    fn string_and_char_literals() {
        assert_eq!(kinds("\"AB\"")[1], num(65 * 256 + 66));
        assert_eq!(kinds(r"'\n'")[1], num(10));
        assert_eq!(kinds(r#""\"""#)[1], num(34));
        assert_eq!(kinds("'a'")[1], num(97));
    }

    #[test]
    fn aliases() {
        assert_eq!(kinds("$double 5 @plus 1")[1..5],
                   [TokenKind::UnaryAlias("double".into()),
                    num(5),
                    TokenKind::BinaryAlias("plus".into()),
                    num(1)]);
    }

    #[test]
    fn malformed_input() {
        assert_eq!(lex_error("x = 1__0"), LexErrorKind::InvalidNumber("1__0".into()));
        assert_eq!(lex_error("x = 1.2.3"), LexErrorKind::InvalidNumber("1.2.3".into()));
        assert_eq!(lex_error("x = \"\""), LexErrorKind::EmptyString);
        assert_eq!(lex_error("x = \"abc"), LexErrorKind::UnterminatedString);
        assert_eq!(lex_error("x = 'a"), LexErrorKind::UnterminatedCharacter);
        assert_eq!(lex_error("x = 'ab'"), LexErrorKind::InvalidCharacter);
        assert_eq!(lex_error(r#"x = "\q""#), LexErrorKind::UnknownEscape('q'));
        assert_eq!(lex_error("x = 1 ! 2"), LexErrorKind::UnexpectedCharacter);
    }

    #[test]
    fn locations_are_one_based_columns() {
        let tokens = lex("a = 1\nbb = a + 2").unwrap();
        let second_a = tokens.iter()
                             .filter(|t| t.kind == ident("a"))
                             .nth(1)
                             .unwrap();
        assert_eq!(second_a.location.line, 2);
        assert_eq!(second_a.location.column, 6);
        assert_eq!(second_a.location.point_out(), "bb = >>>a<<< + 2");
    }

    #[test]
    fn unresolved_include() {
        match lex("include does_not_exist_anywhere\nx = 1") {
            Err(Error::NoSuchFile { path, location }) => {
                assert_eq!(path, "does_not_exist_anywhere");
                assert_eq!(location.line, 1);
            },
            other => panic!("expected a missing include, got {other:?}"),
        }
    }
}
