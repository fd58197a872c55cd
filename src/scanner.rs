use std::str::Chars;

use peekmore::{PeekMore, PeekMoreIterator};

use crate::error::{ScanError, ScanErrors};
use crate::literal::Literal;
use crate::token::{Token, Type};

pub struct Scanner<'a> {
    source: PeekMoreIterator<Chars<'a>>,
    tokens: Vec<Token>,
    errors: Vec<ScanError>,
    line: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner.
    pub fn new(source: &'a str) -> Scanner<'a> {
        Scanner {
            source: source.chars().peekmore(),
            tokens: vec![],
            errors: vec![],
            line: 1,
        }
    }

    /// Scans the source code and returns a vector of tokens. Scanning does
    /// not stop at the first problem; every error is reported at once.
    pub fn scan_tokens(mut self) -> Result<Vec<Token>, ScanErrors> {
        loop {
            let Some(c) = self.source.next() else { break };
            self.scan_token(c);
        }

        self.tokens.push(Token::new(Type::EOF, String::new(), None, self.line));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(ScanErrors(self.errors))
        }
    }

    /// Returns the next character without consuming it.
    fn peek(&mut self) -> char {
        self.source.peek().copied().unwrap_or('\0')
    }

    /// Returns the character after the next one without consuming either.
    fn peek_next(&mut self) -> char {
        self.source.peek_nth(1).copied().unwrap_or('\0')
    }

    /// Consumes the next character if it is the expected character.
    fn matches(&mut self, expected: char) -> bool {
        if self.source.peek() == Some(&expected) {
            self.source.next();
            return true;
        }

        false
    }

    /// Consumes the next character. Only called after a peek.
    fn advance(&mut self) -> char {
        self.source.next().unwrap_or('\0')
    }

    /// Adds a new token to the list of tokens.
    fn add_token(&mut self, r#type: Type, lexeme: String, literal: Option<Literal>) {
        self.tokens.push(Token::new(r#type, lexeme, literal, self.line));
    }

    fn error(&mut self, message: String) {
        self.errors.push(ScanError { line: self.line, message });
    }

    /// Handles a string literal. Strings may span multiple lines and are
    /// delimited by whichever quote opened them.
    fn string(&mut self, quote: char) {
        let mut value = String::new();

        loop {
            match self.source.next() {
                Some(c) if c == quote => {
                    let lexeme = format!("{quote}{value}{quote}");
                    self.add_token(Type::String, lexeme, Some(Literal::String(value)));
                    return;
                },
                Some(c) => {
                    if c == '\n' {
                        self.line += 1;
                    }
                    value.push(c);
                },
                None => {
                    self.error(String::from("Unterminated string"));
                    return;
                },
            }
        }
    }

    /// Handles a number literal. The dot is only part of the number when a
    /// digit follows it, so `1.` scans as a number and a dot.
    fn number(&mut self, first: char) {
        let mut value = String::from(first);
        let mut is_float = false;

        while self.peek().is_ascii_digit() {
            value.push(self.advance());
        }

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            is_float = true;
            value.push(self.advance());

            while self.peek().is_ascii_digit() {
                value.push(self.advance());
            }
        }

        let literal = if is_float {
            Literal::Float(value.parse().unwrap_or(f64::INFINITY))
        } else {
            // A digit run too long for an integer falls back to a float.
            match value.parse::<i64>() {
                Ok(n) => Literal::Integer(n),
                Err(_) => Literal::Float(value.parse().unwrap_or(f64::INFINITY)),
            }
        };

        self.add_token(Type::Number, value, Some(literal));
    }

    /// Handles an identifier or a keyword.
    fn identifier(&mut self, first: char) {
        let mut value = String::from(first);

        // is_alphanumeric does not include underscores.
        while matches!(self.peek(), c if c.is_ascii_alphanumeric() || c == '_') {
            value.push(self.advance());
        }

        let token_type = match value.as_str() {
            "and"      => Type::And,
            "class"    => Type::Class,
            "else"     => Type::Else,
            "false"    => Type::False,
            "for"      => Type::For,
            "fun"      => Type::Fun,
            "if"       => Type::If,
            "nil"      => Type::Nil,
            "or"       => Type::Or,
            "print"    => Type::Print,
            "return"   => Type::Return,
            "super"    => Type::Super,
            "this"     => Type::This,
            "true"     => Type::True,
            "var"      => Type::Var,
            "while"    => Type::While,
            _          => Type::Identifier,
        };

        if token_type == Type::Identifier {
            // Identifiers carry their lexeme as the literal payload as well.
            self.add_token(token_type, value.clone(), Some(Literal::String(value)));
        } else {
            self.add_token(token_type, value, None);
        }
    }

    /// Scans a single token starting at the already consumed character.
    fn scan_token(&mut self, c: char) {
        match c {
            // One character tokens
            '(' => self.add_token(Type::LeftParen, c.to_string(), None),
            ')' => self.add_token(Type::RightParen, c.to_string(), None),
            '{' => self.add_token(Type::LeftBrace, c.to_string(), None),
            '}' => self.add_token(Type::RightBrace, c.to_string(), None),
            ',' => self.add_token(Type::Comma, c.to_string(), None),
            '.' => self.add_token(Type::Dot, c.to_string(), None),
            '+' => self.add_token(Type::Plus, c.to_string(), None),
            ';' => self.add_token(Type::Semicolon, c.to_string(), None),
            '*' => self.add_token(Type::Star, c.to_string(), None),
            '/' => self.add_token(Type::Slash, c.to_string(), None),
            '?' => self.add_token(Type::QuestionMark, c.to_string(), None),
            ':' => self.add_token(Type::Colon, c.to_string(), None),
            '\\' => self.add_token(Type::Backslash, c.to_string(), None),

            // One or two character tokens
            '!' => {
                if self.matches('=') {
                    self.add_token(Type::BangEqual, String::from("!="), None);
                } else {
                    self.add_token(Type::Bang, c.to_string(), None);
                }
            },
            '=' => {
                if self.matches('=') {
                    self.add_token(Type::EqualEqual, String::from("=="), None);
                } else {
                    self.add_token(Type::Equal, c.to_string(), None);
                }
            },
            '<' => {
                if self.matches('=') {
                    self.add_token(Type::LessEqual, String::from("<="), None);
                } else {
                    self.add_token(Type::Less, c.to_string(), None);
                }
            },
            '>' => {
                if self.matches('=') {
                    self.add_token(Type::GreaterEqual, String::from(">="), None);
                } else {
                    self.add_token(Type::Greater, c.to_string(), None);
                }
            },
            '-' => {
                if self.matches('>') {
                    self.add_token(Type::Arrow, String::from("->"), None);
                } else {
                    self.add_token(Type::Minus, c.to_string(), None);
                }
            },

            // Ignore whitespace
            ' ' | '\r' | '\t' => {},

            // Update line counter
            '\n' => self.line += 1,

            // Strings
            '"' | '\'' => self.string(c),

            // Numbers
            c if c.is_ascii_digit() => self.number(c),

            // Identifiers
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier(c),

            _ => self.error(format!("Unrecognized character [{c}]")),
        }
    }
}
