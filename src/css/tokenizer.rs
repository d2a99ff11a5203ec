//! logos-based CSS lexer.
//!
//! Whitespace is a token because it separates compounds in a descendant
//! selector. Comments are skipped. `#name` is a single [`Token::Hash`]; the
//! parser decides whether it is an id or a hex colour.

use std::ops::Range;

use logos::Logos;

fn dimension(lex: &mut logos::Lexer<'_, Token>) -> Option<(f32, String)> {
    let slice = lex.slice();
    let split = slice.find(|c: char| c.is_ascii_alphabetic() || c == '%')?;
    let value = slice[..split].parse().ok()?;
    Some((value, slice[split..].to_owned()))
}

fn without_prefix(lex: &mut logos::Lexer<'_, Token>) -> String {
    lex.slice()[1..].to_owned()
}

fn unquote(lex: &mut logos::Lexer<'_, Token>) -> String {
    let slice = lex.slice();
    slice[1..slice.len() - 1].to_owned()
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum Token {
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[token("!important")]
    Important,

    /// `1fr`, `50%`, `10vw`, `80vh`
    #[regex(r"-?[0-9]+(\.[0-9]+)?(fr|%|vw|vh)", dimension)]
    Dimension((f32, String)),

    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f32>().ok())]
    Number(f32),

    /// `#main` or `#ff0000`, without the `#`.
    #[regex(r"#[a-zA-Z0-9_-]+", without_prefix)]
    Hash(String),

    /// `.title`, without the dot.
    #[regex(r"\.[a-zA-Z_][a-zA-Z0-9_-]*", without_prefix)]
    Class(String),

    /// `:hover`, without the colon. Also what `width:auto` lexes to.
    #[regex(r":[a-zA-Z][a-zA-Z0-9_-]*", without_prefix)]
    Pseudo(String),

    #[regex(r#""[^"]*"|'[^']*'"#, unquote)]
    Str(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*", |lex| lex.slice().to_owned())]
    Ident(String),

    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("*")]
    Star,
    #[token(">")]
    Child,
}

/// Lex `input`, or return the byte offset of the first unrecognised input.
pub fn tokenize(input: &str) -> Result<Vec<(Token, Range<usize>)>, usize> {
    Token::lexer(input)
        .spanned()
        .map(|(token, span)| token.map(|token| (token, span.clone())).map_err(|()| span.start))
        .collect()
}
