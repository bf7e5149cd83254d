//! Lexer for the OneShot language.
//!
//! Converts source text into a flat stream of [`Token`]s ending in a single
//! [`TokenKind::Eof`] marker.

use super::error::Error;
use super::token::{keyword, Token, TokenKind};

pub struct Lexer {
    chars: Vec<char>,
    start: usize,
    pos: usize,
    line: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            start: 0,
            pos: 0,
            line: 1,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia();
            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::Eof, "", self.line));
                break;
            }

            self.start = self.pos;
            let ch = self.advance();
            let kind = match ch {
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                ':' => TokenKind::Colon,
                ',' => TokenKind::Comma,
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '*' => TokenKind::Star,
                '/' => TokenKind::Slash,
                '=' if self.matches('=') => TokenKind::EqEq,
                '=' => TokenKind::Eq,
                '!' => TokenKind::Bang,
                '<' if self.matches('>') => TokenKind::NotEq,
                '<' if self.matches('=') => TokenKind::LessEq,
                '<' => TokenKind::Less,
                '>' if self.matches('=') => TokenKind::GreaterEq,
                '>' => TokenKind::Greater,
                '"' => self.lex_string()?,
                '0'..='9' => self.lex_number()?,
                'a'..='z' | 'A'..='Z' | '_' => self.lex_ident_or_keyword(),
                _ => {
                    return Err(Error::lex(
                        format!("unexpected character: '{ch}'"),
                        self.line,
                    ));
                }
            };

            tokens.push(Token::new(kind, self.lexeme(), self.line));
        }

        Ok(tokens)
    }

    fn peek(&self) -> char {
        self.chars[self.pos]
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.pos];
        self.pos += 1;
        ch
    }

    fn matches(&mut self, expected: char) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn lexeme(&self) -> String {
        self.chars[self.start..self.pos].iter().collect()
    }

    /// Skip whitespace, newlines and `#` comments.
    fn skip_trivia(&mut self) {
        while !self.is_at_end() {
            match self.peek() {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '\n' => {
                    self.advance();
                    self.line += 1;
                }
                '#' => {
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_string(&mut self) -> Result<TokenKind, Error> {
        let line = self.line;
        let mut s = String::new();
        while !self.is_at_end() && self.peek() != '"' {
            let ch = self.advance();
            if ch == '\n' {
                self.line += 1;
            }
            s.push(ch);
        }
        if self.is_at_end() {
            return Err(Error::lex("unterminated string", line));
        }
        self.advance(); // closing '"'
        Ok(TokenKind::Str(s))
    }

    fn lex_number(&mut self) -> Result<TokenKind, Error> {
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            self.advance();
        }

        if !self.is_at_end()
            && self.peek() == '.'
            && self.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.advance(); // '.'
            while !self.is_at_end() && self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text = self.lexeme();
        text.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| Error::lex(format!("invalid number: {text}"), self.line))
    }

    fn lex_ident_or_keyword(&mut self) -> TokenKind {
        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == '_') {
            self.advance();
        }

        let word = self.lexeme();
        keyword(&word).unwrap_or(TokenKind::Ident(word))
    }
}
