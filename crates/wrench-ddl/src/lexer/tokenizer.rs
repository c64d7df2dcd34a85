//! DDL tokenizer.

use super::{Keyword, Span, Token, TokenKind};

/// A lexer that tokenizes Spanner DDL input.
pub struct Lexer<'a> {
    /// The input source text.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    /// Returns the current byte position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the next character without advancing.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skips whitespace and comments (`--`, `#`, `/* */`).
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek().is_some_and(|c| c.is_whitespace()) {
                self.advance();
            }

            if (self.peek() == Some('-') && self.peek_next() == Some('-'))
                || self.peek() == Some('#')
            {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
                continue;
            }

            if self.peek() == Some('/') && self.peek_next() == Some('*') {
                self.advance();
                self.advance();
                loop {
                    match self.advance() {
                        Some('*') if self.peek() == Some('/') => {
                            self.advance();
                            break;
                        }
                        None => break,
                        _ => {}
                    }
                }
                continue;
            }

            break;
        }
    }

    fn make_span(&self) -> Span {
        Span::new(self.start, self.pos)
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    /// Scans an identifier or keyword.
    fn scan_identifier(&mut self) -> Token {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }

        let text = &self.input[self.start..self.pos];
        if let Some(keyword) = Keyword::from_str(text) {
            self.make_token(TokenKind::Keyword(keyword))
        } else {
            self.make_token(TokenKind::Ident(String::from(text)))
        }
    }

    /// Scans a back-quoted identifier.
    fn scan_quoted_identifier(&mut self) -> Token {
        self.advance(); // consume opening backquote
        let content_start = self.pos;

        while self.peek().is_some_and(|c| c != '`') {
            self.advance();
        }
        if self.peek().is_none() {
            return self.make_token(TokenKind::Error(String::from(
                "unterminated quoted identifier",
            )));
        }

        let content = String::from(&self.input[content_start..self.pos]);
        self.advance(); // consume closing backquote
        self.make_token(TokenKind::Ident(content))
    }

    /// Scans a number (integer or float).
    fn scan_number(&mut self) -> Token {
        let mut is_float = false;

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.peek().is_some_and(|c| c == 'e' || c == 'E') {
            is_float = true;
            self.advance();
            if self.peek().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = &self.input[self.start..self.pos];
        if is_float {
            match text.parse::<f64>() {
                Ok(f) => self.make_token(TokenKind::Float(f)),
                Err(e) => self.make_token(TokenKind::Error(format!("invalid float: {e}"))),
            }
        } else {
            match text.parse::<i64>() {
                Ok(i) => self.make_token(TokenKind::Integer(i)),
                Err(e) => self.make_token(TokenKind::Error(format!("invalid integer: {e}"))),
            }
        }
    }

    /// Scans a string literal quoted with `'` or `"`, handling
    /// backslash escapes.
    fn scan_string(&mut self, quote: char) -> Result<String, Token> {
        self.advance(); // consume opening quote
        let mut value = String::new();

        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(value);
                }
                Some('\\') => {
                    self.advance();
                    match self.advance() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some(c) => value.push(c),
                        None => {
                            return Err(self.make_token(TokenKind::Error(String::from(
                                "unterminated string literal",
                            ))));
                        }
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
                None => {
                    return Err(self
                        .make_token(TokenKind::Error(String::from("unterminated string literal"))));
                }
            }
        }
    }

    /// Scans the next token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        self.start = self.pos;

        let c = match self.peek() {
            Some(c) => c,
            None => return self.make_token(TokenKind::Eof),
        };

        match c {
            '(' => {
                self.advance();
                self.make_token(TokenKind::LeftParen)
            }
            ')' => {
                self.advance();
                self.make_token(TokenKind::RightParen)
            }
            '[' => {
                self.advance();
                self.make_token(TokenKind::LeftBracket)
            }
            ']' => {
                self.advance();
                self.make_token(TokenKind::RightBracket)
            }
            ',' => {
                self.advance();
                self.make_token(TokenKind::Comma)
            }
            ';' => {
                self.advance();
                self.make_token(TokenKind::Semicolon)
            }
            '.' => {
                self.advance();
                self.make_token(TokenKind::Dot)
            }
            '+' => {
                self.advance();
                self.make_token(TokenKind::Plus)
            }
            '-' => {
                self.advance();
                self.make_token(TokenKind::Minus)
            }
            '*' => {
                self.advance();
                self.make_token(TokenKind::Star)
            }
            '/' => {
                self.advance();
                self.make_token(TokenKind::Slash)
            }
            '=' => {
                self.advance();
                self.make_token(TokenKind::Eq)
            }
            '|' => {
                self.advance();
                if self.peek() == Some('|') {
                    self.advance();
                    self.make_token(TokenKind::Concat)
                } else {
                    self.make_token(TokenKind::Error(String::from("unexpected character: |")))
                }
            }
            '<' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::LtEq)
                } else if self.peek() == Some('>') {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                } else {
                    self.make_token(TokenKind::Lt)
                }
            }
            '>' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::GtEq)
                } else {
                    self.make_token(TokenKind::Gt)
                }
            }
            '!' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                } else {
                    self.make_token(TokenKind::Error(String::from("unexpected character: !")))
                }
            }
            '\'' | '"' => match self.scan_string(c) {
                Ok(value) => self.make_token(TokenKind::Str(value)),
                Err(token) => token,
            },
            '`' => self.scan_quoted_identifier(),
            'b' | 'B' if matches!(self.peek_next(), Some('\'' | '"')) => {
                self.advance(); // consume prefix
                let quote = self.peek().unwrap_or('"');
                match self.scan_string(quote) {
                    Ok(value) => self.make_token(TokenKind::ByteStr(value)),
                    Err(token) => token,
                }
            }
            c if c.is_ascii_digit() => self.scan_number(),
            c if c.is_alphabetic() || c == '_' => self.scan_identifier(),
            _ => {
                self.advance();
                self.make_token(TokenKind::Error(format!("unexpected character: {c}")))
            }
        }
    }

    /// Tokenizes the entire input.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(token_kinds(""), vec![TokenKind::Eof]);
        assert_eq!(token_kinds("   \n\t "), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            token_kinds("create TABLE PriMary"),
            vec![
                TokenKind::Keyword(Keyword::Create),
                TokenKind::Keyword(Keyword::Table),
                TokenKind::Keyword(Keyword::Primary),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_line_comments() {
        assert_eq!(
            token_kinds("CREATE -- trailing comment\n# another\nTABLE"),
            vec![
                TokenKind::Keyword(Keyword::Create),
                TokenKind::Keyword(Keyword::Table),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_block_comment() {
        assert_eq!(
            token_kinds("CREATE /* hi */ TABLE"),
            vec![
                TokenKind::Keyword(Keyword::Create),
                TokenKind::Keyword(Keyword::Table),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            token_kinds("Users user_id `order`"),
            vec![
                TokenKind::Ident(String::from("Users")),
                TokenKind::Ident(String::from("user_id")),
                TokenKind::Ident(String::from("order")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(
            token_kinds(r#"'36h' "0001-01-01""#),
            vec![
                TokenKind::Str(String::from("36h")),
                TokenKind::Str(String::from("0001-01-01")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            token_kinds(r#"'it\'s' "a\"b""#),
            vec![
                TokenKind::Str(String::from("it's")),
                TokenKind::Str(String::from("a\"b")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_bytes_literal() {
        assert_eq!(
            token_kinds(r#"b"" B'abc'"#),
            vec![
                TokenKind::ByteStr(String::new()),
                TokenKind::ByteStr(String::from("abc")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_bytes_prefix_not_a_literal() {
        // A bare `b` is an ordinary identifier.
        assert_eq!(
            token_kinds("b1 b"),
            vec![
                TokenKind::Ident(String::from("b1")),
                TokenKind::Ident(String::from("b")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            token_kinds("42 3.14 1e3"),
            vec![
                TokenKind::Integer(42),
                TokenKind::Float(3.14),
                TokenKind::Float(1e3),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators_and_delimiters() {
        assert_eq!(
            token_kinds("( ) , ; . < > <= >= = != <> ||"),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Dot,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::NotEq,
                TokenKind::Concat,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_span_tracking() {
        let tokens = Lexer::new("CREATE TABLE").tokenize();
        assert_eq!(tokens[0].span, Span::new(0, 6));
        assert_eq!(tokens[1].span, Span::new(7, 12));
    }
}
