//! Recursive-descent parser: CSS text -> [`StyleSheet`].

use std::ops::Range;

use crate::css::model::{
    Combinator, Compound, Declaration, DeclarationValue, RuleSet, Selector, SimpleSelector,
    StyleSheet,
};
use crate::css::tokenizer::{tokenize, Token};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unrecognised input at byte {0}")]
    InvalidToken(usize),
    #[error("expected {expected} at byte {offset}")]
    Unexpected { expected: &'static str, offset: usize },
    #[error("unexpected end of input, expected {0}")]
    UnexpectedEof(&'static str),
}

/// Parse a whole stylesheet.
pub fn parse_css(input: &str) -> Result<StyleSheet, ParseError> {
    let tokens = tokenize(input).map_err(ParseError::InvalidToken)?;
    let mut parser = Parser { tokens, pos: 0 };
    let mut sheet = StyleSheet::new();
    loop {
        parser.skip_whitespace();
        if parser.peek().is_none() {
            return Ok(sheet);
        }
        sheet.rules.push(parser.rule()?);
    }
}

struct Parser {
    tokens: Vec<(Token, Range<usize>)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(token, _)| token.clone());
        self.pos += 1;
        token
    }

    fn skip_whitespace(&mut self) {
        while self.peek() == Some(&Token::Whitespace) {
            self.pos += 1;
        }
    }

    fn error(&self, expected: &'static str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some((_, span)) => ParseError::Unexpected { expected, offset: span.start },
            None => ParseError::UnexpectedEof(expected),
        }
    }

    fn rule(&mut self) -> Result<RuleSet, ParseError> {
        let mut selectors = vec![self.selector()?];
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(Token::Comma) => {
                    self.pos += 1;
                    self.skip_whitespace();
                    selectors.push(self.selector()?);
                }
                Some(Token::BraceOpen) => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.error("`{` or `,`")),
            }
        }
        let declarations = self.declarations()?;
        Ok(RuleSet { selectors, declarations })
    }

    /// Compounds joined by combinators, returned right to left.
    fn selector(&mut self) -> Result<Selector, ParseError> {
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_space = self.peek() == Some(&Token::Whitespace);
            self.skip_whitespace();
            match self.peek() {
                Some(Token::Child) => {
                    self.pos += 1;
                    self.skip_whitespace();
                    combinators.push(Combinator::Child);
                }
                Some(Token::BraceOpen | Token::Comma) | None => break,
                Some(_) if had_space => combinators.push(Combinator::Descendant),
                Some(_) => return Err(self.error("a combinator")),
            }
            compounds.push(self.compound()?);
        }

        let mut compounds = compounds.into_iter().rev();
        let subject = compounds.next().ok_or(ParseError::UnexpectedEof("a selector"))?;
        let mut selector = Selector::new(subject);
        for (compound, combinator) in compounds.zip(combinators.into_iter().rev()) {
            selector = selector.inside(combinator, compound);
        }
        Ok(selector)
    }

    fn compound(&mut self) -> Result<Compound, ParseError> {
        let mut parts = Vec::new();
        loop {
            let part = match self.peek() {
                Some(Token::Ident(name)) => SimpleSelector::Type(name.clone()),
                Some(Token::Star) => SimpleSelector::Universal,
                Some(Token::Class(name)) => SimpleSelector::Class(name.clone()),
                Some(Token::Hash(name)) => SimpleSelector::Id(name.clone()),
                Some(Token::Pseudo(name)) => SimpleSelector::PseudoClass(name.clone()),
                _ => break,
            };
            parts.push(part);
            self.pos += 1;
        }
        if parts.is_empty() {
            return Err(self.error("a selector"));
        }
        Ok(Compound::new(parts))
    }

    fn declarations(&mut self) -> Result<Vec<Declaration>, ParseError> {
        let mut declarations = Vec::new();
        loop {
            self.skip_whitespace();
            match self.bump() {
                Some(Token::BraceClose) => return Ok(declarations),
                Some(Token::Semicolon) => {}
                Some(Token::Ident(property)) => declarations.push(self.declaration(property)?),
                Some(_) => {
                    self.pos -= 1;
                    return Err(self.error("a property name"));
                }
                None => return Err(ParseError::UnexpectedEof("`}`")),
            }
        }
    }

    fn declaration(&mut self, property: String) -> Result<Declaration, ParseError> {
        self.skip_whitespace();
        let mut values = Vec::new();
        match self.bump() {
            Some(Token::Colon) => {}
            // `width:auto` lexes as a pseudo-class.
            Some(Token::Pseudo(value)) => values.push(DeclarationValue::Ident(value)),
            _ => {
                self.pos -= 1;
                return Err(self.error("`:`"));
            }
        }

        let mut declaration = Declaration::new(property, Vec::new());
        loop {
            let value = match self.peek() {
                Some(Token::Semicolon | Token::BraceClose) => break,
                None => return Err(ParseError::UnexpectedEof("`;` or `}`")),
                Some(Token::Whitespace | Token::Comma) => None,
                Some(Token::Important) => {
                    declaration.important = true;
                    None
                }
                Some(Token::Number(n)) => Some(DeclarationValue::Number(*n)),
                Some(Token::Dimension((n, unit))) => Some(DeclarationValue::Dimension(*n, unit.clone())),
                Some(Token::Ident(name)) => Some(DeclarationValue::Ident(name.clone())),
                Some(Token::Hash(hex)) => Some(DeclarationValue::Color(hex.clone())),
                Some(Token::Str(text)) => Some(DeclarationValue::String(text.clone())),
                Some(_) => return Err(self.error("a value")),
            };
            values.extend(value);
            self.pos += 1;
        }
        declaration.values = values;
        Ok(declaration)
    }
}
