//! Tokenizer built on `logos`.
//!
//! Raw tokens carry only their kind; literal payloads are cooked afterwards
//! so escape errors can be reported with a proper diagnostic.

use std::fmt;

use cel_diagnostic::{Diagnostic, ErrorCode};
use cel_ir::Span;
use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"([ \t\r\n\f]+|//[^\n]*)")]
enum RawToken {
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("in")]
    In,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,

    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("!")]
    Bang,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    #[regex(r"[0-9]+[uU]")]
    #[regex(r"0x[0-9a-fA-F]+[uU]")]
    Uint,
    #[regex(r"[0-9]+")]
    #[regex(r"0x[0-9a-fA-F]+")]
    Int,
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    Double,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    String,
    #[regex(r#"[rR]"[^"\n]*""#)]
    #[regex(r"[rR]'[^'\n]*'")]
    RawString,
    #[regex(r#"[bB]"([^"\\\n]|\\.)*""#)]
    #[regex(r"[bB]'([^'\\\n]|\\.)*'")]
    Bytes,

    #[regex(r"[_a-zA-Z][_a-zA-Z0-9]*")]
    Ident,
}

/// Token kinds with cooked literal payloads.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// Integer magnitude; the sign is applied by the parser so that
    /// `-9223372036854775808` is representable.
    Int(u64),
    Uint(u64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Ident(String),
    True,
    False,
    Null,
    In,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Dot,
    Comma,
    Colon,
    Question,
    AmpAmp,
    PipePipe,
    Bang,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eof,
}

impl TokenKind {
    /// Discriminant-only comparison, ignoring payloads.
    pub fn same_kind(&self, other: &TokenKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Int(n) | TokenKind::Uint(n) => return write!(f, "{n}"),
            TokenKind::Double(d) => return write!(f, "{d}"),
            TokenKind::String(s) => return write!(f, "{s:?}"),
            TokenKind::Bytes(_) => "bytes literal",
            TokenKind::Ident(name) => return write!(f, "{name}"),
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::In => "in",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Dot => ".",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Question => "?",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::Bang => "!",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Eof => "end of input",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Tokenize `source`. The returned list always ends with `Eof`.
pub fn lex(source: &str) -> Result<Vec<Token>, Diagnostic> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);
    while let Some(raw) = lexer.next() {
        let span = to_span(lexer.span())?;
        let slice = lexer.slice();
        let Ok(raw) = raw else {
            return Err(unlexable(span, slice));
        };
        let kind = cook(raw, slice, span)?;
        tokens.push(Token { kind, span });
    }
    let end = to_span(source.len()..source.len())?;
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: end,
    });
    Ok(tokens)
}

fn to_span(range: std::ops::Range<usize>) -> Result<Span, Diagnostic> {
    Span::try_from_range(range).map_err(|e| {
        Diagnostic::error(ErrorCode::E9001).with_message(format!("source too large: {e}"))
    })
}

fn unlexable(span: Span, slice: &str) -> Diagnostic {
    let unterminated = slice
        .trim_start_matches(['r', 'R', 'b', 'B'])
        .starts_with(['"', '\'']);
    if unterminated {
        Diagnostic::error(ErrorCode::E0001)
            .with_message("unterminated string literal")
            .with_label(span, "string starts here")
    } else {
        Diagnostic::error(ErrorCode::E0002)
            .with_message(format!("invalid character `{slice}`"))
            .with_label(span, "not valid here")
    }
}

fn cook(raw: RawToken, slice: &str, span: Span) -> Result<TokenKind, Diagnostic> {
    Ok(match raw {
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Null => TokenKind::Null,
        RawToken::In => TokenKind::In,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Question => TokenKind::Question,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,
        RawToken::Bang => TokenKind::Bang,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Int => TokenKind::Int(parse_integer(slice, span)?),
        RawToken::Uint => TokenKind::Uint(parse_integer(&slice[..slice.len() - 1], span)?),
        RawToken::Double => TokenKind::Double(
            slice
                .parse()
                .map_err(|_| invalid_number(span, slice))?,
        ),
        RawToken::String => {
            let body = &slice[1..slice.len() - 1];
            let bytes = unescape(body, false).map_err(|msg| invalid_escape(span, &msg))?;
            let text = String::from_utf8(bytes)
                .map_err(|_| invalid_escape(span, "escape produces invalid UTF-8"))?;
            TokenKind::String(text)
        }
        RawToken::RawString => TokenKind::String(slice[2..slice.len() - 1].to_owned()),
        RawToken::Bytes => {
            let body = &slice[2..slice.len() - 1];
            TokenKind::Bytes(unescape(body, true).map_err(|msg| invalid_escape(span, &msg))?)
        }
        RawToken::Ident => TokenKind::Ident(slice.to_owned()),
    })
}

fn parse_integer(text: &str, span: Span) -> Result<u64, Diagnostic> {
    let parsed = match text.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|_| invalid_number(span, text))
}

fn invalid_number(span: Span, text: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E0003)
        .with_message(format!("invalid number literal `{text}`"))
        .with_label(span, "out of range or malformed")
}

fn invalid_escape(span: Span, message: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E0004)
        .with_message(format!("invalid escape sequence: {message}"))
        .with_label(span, "in this literal")
}

/// Decode escape sequences of a quoted literal body.
///
/// In byte literals `\x` and octal escapes produce raw bytes; in string
/// literals they produce code points.
fn unescape(body: &str, bytes: bool) -> Result<Vec<u8>, String> {
    let mut out = Vec::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            push_char(&mut out, c);
            continue;
        }
        let Some(escape) = chars.next() else {
            return Err("trailing backslash".to_owned());
        };
        match escape {
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'v' => out.push(0x0b),
            '\\' | '\'' | '"' | '`' | '?' => push_char(&mut out, escape),
            'x' | 'X' => {
                let value = take_digits(&mut chars, 2, 16)?;
                push_code(&mut out, value, bytes)?;
            }
            'u' => {
                let value = take_digits(&mut chars, 4, 16)?;
                push_code(&mut out, value, false)?;
            }
            'U' => {
                let value = take_digits(&mut chars, 8, 16)?;
                push_code(&mut out, value, false)?;
            }
            '0'..='3' => {
                let rest = take_digits(&mut chars, 2, 8)?;
                let value = (u32::from(escape) - u32::from('0')) * 64 + rest;
                push_code(&mut out, value, bytes)?;
            }
            other => return Err(format!("unknown escape `\\{other}`")),
        }
    }
    Ok(out)
}

fn take_digits(chars: &mut std::str::Chars<'_>, count: usize, radix: u32) -> Result<u32, String> {
    let mut value = 0u32;
    for _ in 0..count {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(radix))
            .ok_or_else(|| format!("expected {count} base-{radix} digits"))?;
        value = value * radix + digit;
    }
    Ok(value)
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

fn push_code(out: &mut Vec<u8>, value: u32, raw_byte: bool) -> Result<(), String> {
    if raw_byte {
        let byte = u8::try_from(value).map_err(|_| format!("byte value {value} out of range"))?;
        out.push(byte);
        return Ok(());
    }
    let c = char::from_u32(value).ok_or_else(|| format!("invalid code point {value:#x}"))?;
    push_char(out, c);
    Ok(())
}
