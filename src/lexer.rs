use crate::error::{CompileError, ErrorKind};
use crate::range::{Position, Range};
use std::fmt;

/// Represents the different kinds of tokens that the lexer can produce.
/// Whitespace and `~` comments never become tokens.
#[derive(Debug, PartialEq, Clone)]
pub enum TokenType {
    // == Words & Literals ==
    /// A bare word. Keywords (`let`, `theme`, `font`, `from`) and names
    /// alike are identifiers; the parser decides what they mean.
    Identifier(String),
    /// A string literal, enclosed in `'` or `"`, with escapes removed.
    String(String),
    /// An integer literal. Stored as `f64` because ranges may subdivide it.
    Number(f64),
    /// A hex color literal, stored without its leading `#`.
    Hex(String),

    // == Punctuation & Operators ==
    /// Left Parenthesis: `(`
    LParen,
    /// Right Parenthesis: `)`
    RParen,
    /// Left Brace: `{`
    LBrace,
    /// Right Brace: `}`
    RBrace,
    /// Left Bracket: `[`
    LBracket,
    /// Right Bracket: `]`
    RBracket,
    /// Comma: `,`
    Comma,
    /// Semicolon: `;` (ends a statement, or separates block properties)
    Semicolon,
    /// Colon: `:`
    Colon,
    /// Minus: `-`
    Minus,
    /// Caret: `^` (introduces an interpolation step count)
    Caret,
    /// Dot: `.` (property accessor)
    Dot,
    /// Double Dot: `..` (inclusive range)
    DoubleDot,
    /// Triple Dot: `...` (exclusive range)
    TripleDot,
    /// A run of four or more dots, which has no meaning in the grammar.
    DotRun(usize),
}

impl TokenType {
    fn from_symbol(c: char) -> Option<TokenType> {
        let ttype = match c {
            '(' => TokenType::LParen,
            ')' => TokenType::RParen,
            '{' => TokenType::LBrace,
            '}' => TokenType::RBrace,
            '[' => TokenType::LBracket,
            ']' => TokenType::RBracket,
            ',' => TokenType::Comma,
            ';' => TokenType::Semicolon,
            ':' => TokenType::Colon,
            '-' => TokenType::Minus,
            '^' => TokenType::Caret,
            _ => return None,
        };
        Some(ttype)
    }

    /// True for the bare word `keyword`.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, TokenType::Identifier(word) if word == keyword)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Identifier(name) => write!(f, "identifier '{name}'"),
            TokenType::String(value) => write!(f, "string '{value}'"),
            TokenType::Number(value) => write!(f, "number {value}"),
            TokenType::Hex(value) => write!(f, "hex color #{value}"),
            TokenType::LParen => f.write_str("'('"),
            TokenType::RParen => f.write_str("')'"),
            TokenType::LBrace => f.write_str("'{'"),
            TokenType::RBrace => f.write_str("'}'"),
            TokenType::LBracket => f.write_str("'['"),
            TokenType::RBracket => f.write_str("']'"),
            TokenType::Comma => f.write_str("','"),
            TokenType::Semicolon => f.write_str("';'"),
            TokenType::Colon => f.write_str("':'"),
            TokenType::Minus => f.write_str("'-'"),
            TokenType::Caret => f.write_str("'^'"),
            TokenType::Dot => f.write_str("'.'"),
            TokenType::DoubleDot => f.write_str("'..'"),
            TokenType::TripleDot => f.write_str("'...'"),
            TokenType::DotRun(len) => write!(f, "'{}'", ".".repeat(*len)),
        }
    }
}

/// A token with its type and source range
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub ttype: TokenType,
    pub range: Range,
}

impl Token {
    pub fn new(ttype: TokenType, range: Range) -> Token {
        Token { ttype, range }
    }
}

/// Scans `source` into tokens. Scanning never stops early: errors are
/// collected next to whatever tokens could be produced.
pub fn scan(source: &str) -> (Vec<Token>, Vec<CompileError>) {
    Lexer::new(source).lex()
}

pub struct Lexer<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    position: Position,
    tokens: Vec<Token>,
    errors: Vec<CompileError>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            position: Position::default(),
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn lex(mut self) -> (Vec<Token>, Vec<CompileError>) {
        while let Some(&c) = self.peek() {
            let start = self.position;
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                '~' => self.skip_comment(),
                '.' => self.read_dots(start),
                '#' => self.read_hex(start),
                '\'' | '"' => self.read_string(start, c),
                c if c.is_ascii_digit() => self.read_number(start),
                c => {
                    if let Some(ttype) = TokenType::from_symbol(c) {
                        self.advance();
                        self.push(ttype, start);
                    } else {
                        self.read_identifier(start);
                    }
                }
            }
        }

        log::debug!(
            "scanned {} tokens with {} errors",
            self.tokens.len(),
            self.errors.len()
        );
        (self.tokens, self.errors)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.position.index += c.len_utf8();
        match c {
            '\n' => {
                self.position.line += 1;
                self.position.column = 1;
            }
            '\r' => self.position.column = 1,
            _ => self.position.column += 1,
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    fn push(&mut self, ttype: TokenType, start: Position) {
        self.tokens
            .push(Token::new(ttype, Range::new(start, self.position)));
    }

    fn error(&mut self, kind: ErrorKind, start: Position) {
        self.errors
            .push(CompileError::new(kind, Range::new(start, self.position)));
    }

    fn slice_from(&self, start: Position) -> &'a str {
        &self.input[start.index..self.position.index]
    }

    fn skip_comment(&mut self) {
        while let Some(&c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn read_dots(&mut self, start: Position) {
        let mut len = 0;
        while self.peek() == Some(&'.') {
            self.advance();
            len += 1;
        }
        let ttype = match len {
            1 => TokenType::Dot,
            2 => TokenType::DoubleDot,
            3 => TokenType::TripleDot,
            _ => TokenType::DotRun(len),
        };
        self.push(ttype, start);
    }

    fn read_number(&mut self, start: Position) {
        while self.peek().is_some_and(char::is_ascii_digit) {
            self.advance();
        }
        // A run of ASCII digits always parses as f64.
        let value = self.slice_from(start).parse::<f64>().unwrap_or_default();
        self.push(TokenType::Number(value), start);
    }

    fn read_hex(&mut self, start: Position) {
        self.advance(); // Consume the '#'
        let digits_start = self.position;
        while self.peek().is_some_and(char::is_ascii_hexdigit) {
            self.advance();
        }
        let digits = self.slice_from(digits_start);
        if digits.is_empty() {
            self.error(ErrorKind::EmptyHexLiteral, start);
        } else {
            self.push(TokenType::Hex(digits.to_string()), start);
        }
    }

    fn read_string(&mut self, start: Position, terminator: char) {
        self.advance(); // Consume the opening quote
        let mut value = String::new();
        let mut escaped = false;

        while let Some(c) = self.advance() {
            if c == '\n' {
                self.error(ErrorKind::UnterminatedString, start);
            }

            if escaped {
                value.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == terminator {
                self.push(TokenType::String(value), start);
                return;
            } else {
                value.push(c);
            }
        }

        self.error(ErrorKind::UnterminatedStringAtEof, start);
    }

    fn read_identifier(&mut self, start: Position) {
        while let Some(&c) = self.peek() {
            if ends_word(c) {
                break;
            }
            self.advance();
        }
        let word = self.slice_from(start);
        if !word.is_empty() {
            self.push(TokenType::Identifier(word.to_string()), start);
        }
    }
}

fn ends_word(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '~' | '.' | '#' | '\'' | '"')
        || c.is_ascii_digit()
        || TokenType::from_symbol(c).is_some()
}
