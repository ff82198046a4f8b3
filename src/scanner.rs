use std::str::Chars;

use peekmore::{PeekMore, PeekMoreIterator};

use crate::error::{ScanError, Throw};
use crate::literal::Literal;
use crate::token::{Token, Type};

/// Scans source text into a list of tokens terminated by an EOF sentinel.
///
/// The scanner walks the character stream directly; lexemes are accumulated
/// as characters are consumed instead of sliced out of the source by offset.
pub struct Scanner<'a> {
    source: PeekMoreIterator<Chars<'a>>,
    tokens: Vec<Token>,
    line: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner.
    pub fn new(source: &'a str) -> Scanner<'a> {
        Scanner {
            source: source.chars().peekmore(),
            tokens: vec![],
            line: 1,
        }
    }

    /// Scans the source code and returns the tokens.
    /// Lexical errors are reported as they are found and scanning continues,
    /// so a single run can surface every bad character in the input.
    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.scan_token();
        }

        self.tokens.push(Token::new(Type::EOF, String::new(), None, self.line));
        self.tokens
    }

    /// Returns if the scanner has consumed all of the source.
    fn is_at_end(&mut self) -> bool {
        self.source.reset_cursor();
        self.source.peek().is_none()
    }

    /// Consumes and returns the next character.
    fn advance(&mut self) -> char {
        self.source.next().unwrap_or('\0')
    }

    /// Returns the next character without consuming it.
    fn peek(&mut self) -> char {
        self.source.reset_cursor();
        self.source.peek().copied().unwrap_or('\0')
    }

    /// Returns the character after the next one without consuming either.
    fn peek_next(&mut self) -> char {
        self.source.reset_cursor();
        self.source.peek_next().copied().unwrap_or('\0')
    }

    /// Consumes the next character if it is the expected one.
    fn match_next(&mut self, expected: char) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Adds a new token without a literal value to the list of tokens.
    fn add_token(&mut self, r#type: Type, lexeme: &str) {
        self.tokens.push(Token::new(r#type, lexeme.to_string(), None, self.line));
    }

    /// Handles a string literal. Strings may span multiple lines and have no
    /// escape sequences.
    fn string(&mut self) {
        let start = self.line;
        let mut value = String::new();

        while !self.is_at_end() && self.peek() != '"' {
            let c = self.advance();
            if c == '\n' {
                self.line += 1;
            }
            value.push(c);
        }

        if self.is_at_end() {
            // Reported at the line of the opening quote.
            ScanError {
                line: start,
                message: String::from("Unterminated string."),
            }.throw();
            return;
        }

        self.advance(); // The closing quote.

        // The literal drops the quotes, the lexeme keeps them.
        let lexeme = format!("\"{value}\"");
        self.tokens.push(Token::new(Type::String, lexeme, Some(Literal::String(value)), self.line));
    }

    /// Handles a number literal.
    fn number(&mut self, first: char) {
        let mut value = String::from(first);

        while self.peek().is_ascii_digit() {
            value.push(self.advance());
        }

        // A dot is only part of the number when a digit follows it. `123.`
        // leaves the dot behind to be scanned as its own token.
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            value.push(self.advance());

            while self.peek().is_ascii_digit() {
                value.push(self.advance());
            }
        }

        let number: f64 = value.parse().expect("scanned number to parse as a float");
        self.tokens.push(Token::new(Type::Number, value, Some(Literal::Number(number)), self.line));
    }

    /// Handles an identifier or a keyword.
    fn identifier(&mut self, first: char) {
        let mut value = String::from(first);

        // is_alphanumeric does not include underscores.
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            value.push(self.advance());
        }

        let r#type = match value.as_str() {
            "and"    => Type::And,
            "class"  => Type::Class,
            "else"   => Type::Else,
            "false"  => Type::False,
            "for"    => Type::For,
            "fun"    => Type::Fun,
            "if"     => Type::If,
            "nil"    => Type::Nil,
            "or"     => Type::Or,
            "print"  => Type::Print,
            "return" => Type::Return,
            "super"  => Type::Super,
            "this"   => Type::This,
            "true"   => Type::True,
            "var"    => Type::Var,
            "while"  => Type::While,
            _        => Type::Identifier,
        };

        self.tokens.push(Token::new(r#type, value, None, self.line));
    }

    /// Scans the next token.
    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            // One character tokens
            '(' => self.add_token(Type::LeftParen, "("),
            ')' => self.add_token(Type::RightParen, ")"),
            '{' => self.add_token(Type::LeftBrace, "{"),
            '}' => self.add_token(Type::RightBrace, "}"),
            ',' => self.add_token(Type::Comma, ","),
            '.' => self.add_token(Type::Dot, "."),
            '-' => self.add_token(Type::Minus, "-"),
            '+' => self.add_token(Type::Plus, "+"),
            ';' => self.add_token(Type::Semicolon, ";"),
            '*' => self.add_token(Type::Star, "*"),

            // One or two character tokens
            '!' => {
                if self.match_next('=') {
                    self.add_token(Type::BangEqual, "!=");
                } else {
                    self.add_token(Type::Bang, "!");
                }
            },
            '=' => {
                if self.match_next('=') {
                    self.add_token(Type::EqualEqual, "==");
                } else {
                    self.add_token(Type::Equal, "=");
                }
            },
            '<' => {
                if self.match_next('=') {
                    self.add_token(Type::LessEqual, "<=");
                } else {
                    self.add_token(Type::Less, "<");
                }
            },
            '>' => {
                if self.match_next('=') {
                    self.add_token(Type::GreaterEqual, ">=");
                } else {
                    self.add_token(Type::Greater, ">");
                }
            },
            '/' => {
                if self.match_next('/') {
                    // A comment runs until the end of the line.
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                } else {
                    self.add_token(Type::Slash, "/");
                }
            },

            // Ignore whitespace
            ' ' | '\r' | '\t' => {},

            // Update line counter
            '\n' => self.line += 1,

            '"' => self.string(),

            c if c.is_ascii_digit() => self.number(c),

            c if c.is_alphabetic() || c == '_' => self.identifier(c),

            _ => {
                ScanError {
                    line: self.line,
                    message: String::from("Unexpected character."),
                }.throw();
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn types(source: &str) -> Vec<Type> {
        Scanner::new(source).scan_tokens().into_iter().map(|token| token.r#type).collect()
    }

    #[test]
    fn scans_arithmetic() {
        let tokens = Scanner::new("1 + 2;").scan_tokens();

        assert_eq!(tokens[0], Token::new(Type::Number, "1".to_string(), Some(Literal::Number(1.0)), 1));
        assert_eq!(tokens[1], Token::new(Type::Plus, "+".to_string(), None, 1));
        assert_eq!(tokens[2], Token::new(Type::Number, "2".to_string(), Some(Literal::Number(2.0)), 1));
        assert_eq!(tokens[3], Token::new(Type::Semicolon, ";".to_string(), None, 1));
        assert_eq!(tokens[4], Token::new(Type::EOF, String::new(), None, 1));
    }

    #[test]
    fn scans_two_char_operators() {
        assert_eq!(
            types("! != = == < <= > >="),
            vec![
                Type::Bang, Type::BangEqual, Type::Equal, Type::EqualEqual,
                Type::Less, Type::LessEqual, Type::Greater, Type::GreaterEqual,
                Type::EOF,
            ],
        );
    }

    #[test]
    fn scans_keywords_and_identifiers() {
        assert_eq!(
            types("var nil class classy _under"),
            vec![Type::Var, Type::Nil, Type::Class, Type::Identifier, Type::Identifier, Type::EOF],
        );
    }

    #[test]
    fn trailing_dot_is_not_consumed() {
        let tokens = Scanner::new("123.").scan_tokens();

        assert_eq!(tokens[0].r#type, Type::Number);
        assert_eq!(tokens[0].literal, Some(Literal::Number(123.0)));
        assert_eq!(tokens[1].r#type, Type::Dot);
    }

    #[test]
    fn fractions_need_a_leading_digit() {
        assert_eq!(types(".5"), vec![Type::Dot, Type::Number, Type::EOF]);
    }

    #[test]
    fn comments_run_to_end_of_line() {
        let tokens = Scanner::new("a // b c d\nb").scan_tokens();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].lexeme, "a");
        assert_eq!(tokens[1].lexeme, "b");
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn slash_alone_is_division() {
        assert_eq!(types("1 / 2"), vec![Type::Number, Type::Slash, Type::Number, Type::EOF]);
    }

    #[test]
    fn strings_span_lines() {
        let tokens = Scanner::new("\"one\ntwo\"").scan_tokens();

        assert_eq!(tokens[0].literal, Some(Literal::String("one\ntwo".to_string())));
        assert_eq!(tokens[0].lexeme, "\"one\ntwo\"");
        assert_eq!(tokens[1].line, 2);
    }
}
