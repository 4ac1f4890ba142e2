//! Scanner for formula strings.

use crate::error::LexerError;
use crate::lexer::token::{Token, TokenKind};
use crate::span::Span;

/// The lexer transforms a formula into a stream of tokens.
pub struct Scanner<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    line: usize,
    column: usize,
    start_pos: usize,
    start_line: usize,
    start_column: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            line: 1,
            column: 1,
            start_pos: 0,
            start_line: 1,
            start_column: 1,
        }
    }

    /// Scan all tokens from the source.
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.scan_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    /// Scan the next token.
    pub fn scan_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace();
        self.mark_start();

        let Some((_, c)) = self.advance() else {
            return Ok(Token::eof(self.current_pos, self.line, self.column));
        };

        match c {
            '(' => Ok(self.make_token(TokenKind::LeftParen)),
            ')' => Ok(self.make_token(TokenKind::RightParen)),
            '+' => Ok(self.make_token(TokenKind::Plus)),
            '-' => Ok(self.make_token(TokenKind::Minus)),
            '*' => Ok(self.make_token(TokenKind::Star)),
            '/' => Ok(self.make_token(TokenKind::Slash)),

            // Numbers, including the `.5` form
            c if c.is_ascii_digit() => self.scan_number(c),
            '.' if self.peek().is_some_and(|n| n.is_ascii_digit()) => self.scan_number(c),

            c if c.is_alphabetic() || c == '_' => self.scan_identifier(c),

            _ => Err(LexerError::unexpected_char(c, self.current_span())),
        }
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r') => {
                    self.advance();
                }
                Some('\n') => {
                    self.advance();
                    self.line += 1;
                    self.column = 1;
                }
                _ => break,
            }
        }
    }

    fn scan_number(&mut self, first: char) -> Result<Token, LexerError> {
        let mut value = String::from(first);
        let mut seen_dot = first == '.';

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                value.push(c);
                self.advance();
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                value.push(c);
                self.advance();
            } else {
                break;
            }
        }

        // `5.` parses as 5
        let n: f64 = value
            .trim_end_matches('.')
            .parse()
            .map_err(|_| LexerError::invalid_number(value.clone(), self.current_span()))?;
        Ok(self.make_token(TokenKind::Number(n)))
    }

    fn scan_identifier(&mut self, first: char) -> Result<Token, LexerError> {
        let mut value = String::from(first);

        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                value.push(c);
                self.advance();
            } else {
                break;
            }
        }

        Ok(self.make_token(TokenKind::Identifier(value)))
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        if let Some((pos, c)) = self.chars.next() {
            self.current_pos = pos + c.len_utf8();
            self.column += 1;
            Some((pos, c))
        } else {
            None
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn mark_start(&mut self) {
        self.start_pos = self.current_pos;
        self.start_line = self.line;
        self.start_column = self.column;
    }

    fn current_span(&self) -> Span {
        Span::new(
            self.start_pos,
            self.current_pos,
            self.start_line,
            self.start_column,
        )
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.current_span())
    }

    /// The formula being scanned.
    pub fn source(&self) -> &'a str {
        self.source
    }
}
