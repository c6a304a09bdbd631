use std::fmt;

use crate::dsl::error::LexError;

/// 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Span {
    /// Line number, starting at 1.
    pub line: u32,
    /// Column in characters, starting at 1.
    pub column: u32,
}

impl Span {
    /// Construct a span from a line/column pair.
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Reserved words. Matching is case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Background,
    Fps,
    Duration,
    Canvas,
    Shape,
    Circle,
    Rect,
    Text,
    Move,
    Id,
    At,
    Radius,
    Width,
    Height,
    Size,
    Color,
    To,
    Dur,
    Ease,
}

impl Keyword {
    fn from_word(s: &str) -> Option<Self> {
        Some(match s {
            "BACKGROUND" => Self::Background,
            "FPS" => Self::Fps,
            "DURATION" => Self::Duration,
            "CANVAS" => Self::Canvas,
            "SHAPE" => Self::Shape,
            "CIRCLE" => Self::Circle,
            "RECT" => Self::Rect,
            "TEXT" => Self::Text,
            "MOVE" => Self::Move,
            "ID" => Self::Id,
            "AT" => Self::At,
            "RADIUS" => Self::Radius,
            "WIDTH" => Self::Width,
            "HEIGHT" => Self::Height,
            "SIZE" => Self::Size,
            "COLOR" => Self::Color,
            "TO" => Self::To,
            "DUR" => Self::Dur,
            "EASE" => Self::Ease,
            _ => return None,
        })
    }

    /// Source spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Background => "BACKGROUND",
            Self::Fps => "FPS",
            Self::Duration => "DURATION",
            Self::Canvas => "CANVAS",
            Self::Shape => "SHAPE",
            Self::Circle => "CIRCLE",
            Self::Rect => "RECT",
            Self::Text => "TEXT",
            Self::Move => "MOVE",
            Self::Id => "ID",
            Self::At => "AT",
            Self::Radius => "RADIUS",
            Self::Width => "WIDTH",
            Self::Height => "HEIGHT",
            Self::Size => "SIZE",
            Self::Color => "COLOR",
            Self::To => "TO",
            Self::Dur => "DUR",
            Self::Ease => "EASE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Keyword(Keyword),
    Ident(String),
    Number(f64),
    /// `#RRGGBB`, kept as written.
    Color(String),
    /// Quoted string with escapes resolved.
    Str(String),
    /// `x,y` written without whitespace.
    Coord(f64, f64),
    Eof,
}

impl TokenKind {
    /// Short description used in syntax error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Keyword(k) => format!("keyword {}", k.as_str()),
            Self::Ident(s) => format!("identifier '{s}'"),
            Self::Number(_) => "number".to_owned(),
            Self::Color(s) => format!("color {s}"),
            Self::Str(_) => "string".to_owned(),
            Self::Coord(..) => "coordinate pair".to_owned(),
            Self::Eof => "end of input".to_owned(),
        }
    }
}

/// One lexed token. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token (empty for `Eof`).
    pub lexeme: String,
    pub span: Span,
}

/// Convert source text into tokens, ending with a single `Eof`.
///
/// Single pass, no backtracking. Whitespace only matters for positions. A `#` that is the
/// first non-blank character on a line starts a comment; anywhere else it starts a color.
pub fn lex(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    line_has_token: bool,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            line_has_token: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
            self.line_has_token = false;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn span(&self) -> Span {
        Span::new(self.line, self.column)
    }

    fn text(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }

    /// Text from `start` up to the next whitespace, for error reporting.
    fn lexeme_from(&self, start: usize) -> String {
        self.chars[start..]
            .iter()
            .take_while(|c| !c.is_whitespace())
            .collect()
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut out = Vec::new();

        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
                continue;
            }
            if c == '#' && !self.line_has_token {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.bump();
                }
                continue;
            }

            let span = self.span();
            let start = self.pos;
            let kind = if c == '"' {
                self.string(span)?
            } else if c == '#' {
                self.color(span)?
            } else if c.is_ascii_digit()
                || (c == '-' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit()))
            {
                self.number_or_coord(span)?
            } else if c.is_ascii_alphabetic() || c == '_' {
                self.word()
            } else {
                return Err(LexError::new(
                    span,
                    c.to_string(),
                    format!("unexpected character '{c}'"),
                ));
            };

            self.line_has_token = true;
            out.push(Token {
                kind,
                lexeme: self.text(start),
                span,
            });
        }

        out.push(Token {
            kind: TokenKind::Eof,
            lexeme: String::new(),
            span: self.span(),
        });
        Ok(out)
    }

    fn string(&mut self, span: Span) -> Result<TokenKind, LexError> {
        let start = self.pos;
        self.bump();
        let mut value = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(LexError::new(
                        span,
                        self.text(start),
                        "unterminated string literal",
                    ));
                }
                Some('"') => {
                    self.bump();
                    return Ok(TokenKind::Str(value));
                }
                Some('\\') => {
                    let esc_span = self.span();
                    self.bump();
                    match self.bump() {
                        Some('"') => value.push('"'),
                        Some('\\') => value.push('\\'),
                        Some('n') => value.push('\n'),
                        other => {
                            let seq = other.map(|c| format!("\\{c}")).unwrap_or_default();
                            return Err(LexError::new(
                                esc_span,
                                seq,
                                "unknown escape sequence in string",
                            ));
                        }
                    }
                }
                Some(c) => {
                    self.bump();
                    value.push(c);
                }
            }
        }
    }

    fn color(&mut self, span: Span) -> Result<TokenKind, LexError> {
        let start = self.pos;
        self.bump();
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.bump();
        }
        let lexeme = self.text(start);
        let digits = &lexeme[1..];
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(LexError::new(
                span,
                lexeme,
                "malformed color literal (expected # followed by 6 hex digits)",
            ));
        }
        Ok(TokenKind::Color(lexeme))
    }

    /// Scan `-?[0-9]+(\.[0-9]+)?` and return its value.
    fn scan_number(&mut self, token_start: usize) -> Result<f64, LexError> {
        let span = self.span();
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return Err(LexError::new(
                span,
                self.lexeme_from(token_start),
                "malformed number",
            ));
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') {
            self.bump();
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(LexError::new(
                    span,
                    self.lexeme_from(token_start),
                    "malformed number (expected digits after '.')",
                ));
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        self.text(start).parse::<f64>().map_err(|_| {
            LexError::new(span, self.lexeme_from(token_start), "malformed number")
        })
    }

    fn number_or_coord(&mut self, span: Span) -> Result<TokenKind, LexError> {
        let start = self.pos;
        let x = self.scan_number(start)?;
        let kind = if self.peek() == Some(',') {
            self.bump();
            let y = self.scan_number(start).map_err(|e| {
                LexError::new(span, e.lexeme, "malformed coordinate pair (expected x,y)")
            })?;
            TokenKind::Coord(x, y)
        } else {
            TokenKind::Number(x)
        };

        // `12abc`, `1.2.3`, `1,2,3` and friends are one bad lexeme, not several tokens.
        if self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | ',' | '_' | '#'))
        {
            return Err(LexError::new(
                span,
                self.lexeme_from(start),
                "malformed numeric literal",
            ));
        }
        Ok(kind)
    }

    fn word(&mut self) -> TokenKind {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            self.bump();
        }
        let s = self.text(start);
        match Keyword::from_word(&s) {
            Some(k) => TokenKind::Keyword(k),
            None => TokenKind::Ident(s),
        }
    }
}
