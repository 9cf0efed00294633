//! Single-pass scanner.
//!
//! Turns an input string into a token stream, discarding whitespace and
//! `--` line comments. Every token records the 1-based line and column
//! it started at.

mod token;

pub use token::{Token, TokenKind};

use std::iter::Peekable;
use std::str::Chars;

use vellum_common::{VellumError, VellumResult};

/// Tokenizes `input`, appending a final [`TokenKind::Eof`] token.
pub fn tokenize(input: &str) -> VellumResult<Vec<Token>> {
    Lexer::new(input).run()
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: u32,
    col: u32,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            col: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        match c {
            Some('\n') => {
                self.line += 1;
                self.col = 1;
            }
            Some(_) => self.col += 1,
            None => {}
        }
        c
    }

    fn bump_if(&mut self, pred: impl Fn(char) -> bool) -> Option<char> {
        match self.peek() {
            Some(c) if pred(c) => self.bump(),
            _ => None,
        }
    }

    fn run(mut self) -> VellumResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.bump();
            }

            let (line, col) = (self.line, self.col);
            let Some(c) = self.bump() else {
                tokens.push(Token::new(TokenKind::Eof, line, col));
                return Ok(tokens);
            };

            let kind = match c {
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                ',' => TokenKind::Comma,
                ';' => TokenKind::Semicolon,
                ':' => TokenKind::Colon,
                '.' => TokenKind::Dot,
                '*' => TokenKind::Asterisk,
                '=' => TokenKind::Eq,
                '?' => TokenKind::Positional,
                '!' => {
                    if self.peek() == Some('=') {
                        self.bump();
                        TokenKind::Neq
                    } else {
                        return Err(VellumError::syntax(line, col, "expected '=' after '!'"));
                    }
                }
                '<' => {
                    if self.peek() == Some('=') {
                        self.bump();
                        TokenKind::Lte
                    } else {
                        TokenKind::Lt
                    }
                }
                '>' => {
                    if self.peek() == Some('=') {
                        self.bump();
                        TokenKind::Gte
                    } else {
                        TokenKind::Gt
                    }
                }
                '$' => {
                    if self.peek().is_some_and(is_ident_start) {
                        TokenKind::NamedParam(self.scan_ident_tail(String::new()))
                    } else {
                        return Err(VellumError::syntax(
                            line,
                            col,
                            "expected identifier after '$'",
                        ));
                    }
                }
                '\'' => self.scan_string(line, col)?,
                '-' => match self.peek() {
                    Some('-') => {
                        // Line comment: discard to end of line.
                        while self.peek().is_some_and(|c| c != '\n') {
                            self.bump();
                        }
                        continue;
                    }
                    Some(next) if next.is_ascii_digit() => self.scan_number('-', line, col)?,
                    _ => {
                        return Err(VellumError::syntax(line, col, "unexpected character '-'"));
                    }
                },
                '+' => match self.peek() {
                    Some(next) if next.is_ascii_digit() => self.scan_number('+', line, col)?,
                    _ => {
                        return Err(VellumError::syntax(line, col, "unexpected character '+'"));
                    }
                },
                c if c.is_ascii_digit() => self.scan_number(c, line, col)?,
                c if is_ident_start(c) => {
                    let ident = self.scan_ident_tail(String::from(c));
                    TokenKind::lookup_keyword(&ident).unwrap_or(TokenKind::Ident(ident))
                }
                c => {
                    return Err(VellumError::syntax(
                        line,
                        col,
                        format!("unexpected character {c:?}"),
                    ));
                }
            };

            tokens.push(Token::new(kind, line, col));
        }
    }

    fn scan_ident_tail(&mut self, mut ident: String) -> String {
        while let Some(c) = self.bump_if(is_ident_continue) {
            ident.push(c);
        }
        ident
    }

    fn scan_string(&mut self, line: u32, col: u32) -> VellumResult<TokenKind> {
        let mut text = String::new();

        loop {
            match self.bump() {
                None => {
                    return Err(VellumError::syntax(line, col, "unterminated string literal"));
                }
                Some('\'') => {
                    // A doubled quote is an escaped quote.
                    if self.peek() == Some('\'') {
                        self.bump();
                        text.push('\'');
                    } else {
                        return Ok(TokenKind::Str(text));
                    }
                }
                Some(c) => text.push(c),
            }
        }
    }

    fn scan_number(&mut self, first: char, line: u32, col: u32) -> VellumResult<TokenKind> {
        let mut literal = String::from(first);
        let mut is_float = false;

        while let Some(c) = self.bump_if(|c| c.is_ascii_digit()) {
            literal.push(c);
        }

        if let Some(c) = self.bump_if(|c| c == '.') {
            is_float = true;
            literal.push(c);
            while let Some(c) = self.bump_if(|c| c.is_ascii_digit()) {
                literal.push(c);
            }
        }

        if let Some(c) = self.bump_if(|c| matches!(c, 'e' | 'E')) {
            is_float = true;
            literal.push(c);
            if let Some(c) = self.bump_if(|c| matches!(c, '+' | '-')) {
                literal.push(c);
            }
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(VellumError::syntax(line, col, "malformed number literal"));
            }
            while let Some(c) = self.bump_if(|c| c.is_ascii_digit()) {
                literal.push(c);
            }
        }

        if is_float {
            let value = literal
                .parse::<f64>()
                .map_err(|_| VellumError::syntax(line, col, "malformed number literal"))?;
            Ok(TokenKind::Float(value))
        } else {
            let value = literal
                .parse::<i64>()
                .map_err(|_| VellumError::NumberOverflow { line, col })?;
            Ok(TokenKind::Integer(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_punctuation_and_operators() {
        assert_eq!(
            kinds("( ) , ; : = != < <= > >= ? . *"),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Colon,
                TokenKind::Eq,
                TokenKind::Neq,
                TokenKind::Lt,
                TokenKind::Lte,
                TokenKind::Gt,
                TokenKind::Gte,
                TokenKind::Positional,
                TokenKind::Dot,
                TokenKind::Asterisk,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            kinds("select FROM Where"),
            vec![
                TokenKind::KwSelect,
                TokenKind::KwFrom,
                TokenKind::KwWhere,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_identifiers_stay_case_sensitive() {
        assert_eq!(
            kinds("Users _tmp x2"),
            vec![
                TokenKind::Ident("Users".into()),
                TokenKind::Ident("_tmp".into()),
                TokenKind::Ident("x2".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("42 -7 +3 10.4 -0.5 1e3 2E-2"),
            vec![
                TokenKind::Integer(42),
                TokenKind::Integer(-7),
                TokenKind::Integer(3),
                TokenKind::Float(10.4),
                TokenKind::Float(-0.5),
                TokenKind::Float(1e3),
                TokenKind::Float(2e-2),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_integer_overflow() {
        let err = tokenize("99999999999999999999").unwrap_err();
        assert!(matches!(err, VellumError::NumberOverflow { line: 1, col: 1 }));

        // i64::MIN still fits.
        assert_eq!(
            kinds("-9223372036854775808"),
            vec![TokenKind::Integer(i64::MIN), TokenKind::Eof]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            kinds("'hello' 'it''s' ''"),
            vec![
                TokenKind::Str("hello".into()),
                TokenKind::Str("it's".into()),
                TokenKind::Str(String::new()),
                TokenKind::Eof
            ]
        );

        assert!(matches!(
            tokenize("'unterminated"),
            Err(VellumError::SyntaxError { .. })
        ));
    }

    #[test]
    fn test_parameters() {
        assert_eq!(
            kinds("? $age"),
            vec![
                TokenKind::Positional,
                TokenKind::NamedParam("age".into()),
                TokenKind::Eof
            ]
        );

        assert!(matches!(
            tokenize("$ x"),
            Err(VellumError::SyntaxError { .. })
        ));
    }

    #[test]
    fn test_line_comments() {
        assert_eq!(
            kinds("a -- the rest is ignored\nb"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Ident("b".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("ab\n  cd").unwrap();
        assert_eq!((tokens[0].line, tokens[0].col), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].col), (2, 3));
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("a # b").unwrap_err();
        match err {
            VellumError::SyntaxError { line, col, .. } => {
                assert_eq!((line, col), (1, 3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bare_minus_is_an_error() {
        assert!(matches!(
            tokenize("a - b"),
            Err(VellumError::SyntaxError { .. })
        ));
    }
}
