use crate::animation::ease::Ease;
use crate::dsl::error::SyntaxError;
use crate::dsl::lexer::{Keyword, Span, Token, TokenKind, lex};
use crate::foundation::core::{Canvas, Point};
use crate::foundation::error::ReelResult;
use crate::scene::model::{MoveDirective, Movement, ObjectKind, Scene, SceneObject};

/// Lex and parse `src` into an unvalidated [`Scene`].
pub fn parse_scene(src: &str) -> ReelResult<Scene> {
    let tokens = lex(src)?;
    tracing::debug!(tokens = tokens.len(), "lexed scene source");
    Ok(parse_tokens(&tokens)?)
}

/// Build a [`Scene`] from tokens.
///
/// Globals (`BACKGROUND`, `FPS`, `DURATION`, `CANVAS`) may appear anywhere, at most once each;
/// missing ones take the defaults in [`crate::scene::model`]. `SHAPE`/`TEXT`/`MOVE` are kept in
/// program order. Ids are recorded, never resolved here. The first error aborts the parse.
pub fn parse_tokens(tokens: &[Token]) -> Result<Scene, SyntaxError> {
    let eof = Token {
        kind: TokenKind::Eof,
        lexeme: String::new(),
        span: tokens.last().map(|t| t.span).unwrap_or(Span::new(1, 1)),
    };
    let mut p = Parser {
        tokens,
        pos: 0,
        eof,
    };
    p.parse_program()
}

#[derive(Default)]
struct Globals {
    background: Option<String>,
    fps: Option<u32>,
    duration_secs: Option<f64>,
    canvas: Option<Canvas>,
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    eof: Token,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> &Token {
        self.tokens.get(self.pos + n).unwrap_or(&self.eof)
    }

    fn bump(&mut self) -> Token {
        let t = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn error_here(&self, expected: &str) -> SyntaxError {
        let t = self.peek();
        SyntaxError::new(
            t.span,
            format!("expected {expected}, found {}", t.kind.describe()),
        )
    }

    fn at_keyword(&self, kw: Keyword) -> bool {
        self.peek().kind == TokenKind::Keyword(kw)
    }

    fn expect_keyword(&mut self, kw: Keyword) -> Result<Span, SyntaxError> {
        if self.at_keyword(kw) {
            Ok(self.bump().span)
        } else {
            Err(self.error_here(kw.as_str()))
        }
    }

    fn consume_keyword(&mut self, kw: Keyword) -> bool {
        if self.at_keyword(kw) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn parse_program(&mut self) -> Result<Scene, SyntaxError> {
        let mut globals = Globals::default();
        let mut objects = Vec::new();
        let mut moves = Vec::new();

        loop {
            let t = self.bump();
            let kw = match &t.kind {
                TokenKind::Eof => break,
                TokenKind::Keyword(kw) => *kw,
                other => {
                    return Err(SyntaxError::new(
                        t.span,
                        format!("expected a directive, found {}", other.describe()),
                    ));
                }
            };

            match kw {
                Keyword::Background => {
                    let color = self.parse_color()?;
                    set_once(&mut globals.background, color, &t)?;
                }
                Keyword::Fps => {
                    let fps = self.parse_uint("frame rate")?;
                    set_once(&mut globals.fps, fps, &t)?;
                }
                Keyword::Duration => {
                    let secs = self.parse_number("duration in seconds")?;
                    set_once(&mut globals.duration_secs, secs, &t)?;
                }
                Keyword::Canvas => {
                    let canvas = self.parse_canvas()?;
                    set_once(&mut globals.canvas, canvas, &t)?;
                }
                Keyword::Shape => objects.push(self.parse_shape(t.span)?),
                Keyword::Text => objects.push(self.parse_text(t.span)?),
                Keyword::Move => moves.push(self.parse_move(t.span, objects.len())?),
                other => {
                    return Err(SyntaxError::new(
                        t.span,
                        format!(
                            "expected a directive, found keyword {} outside of one",
                            other.as_str()
                        ),
                    ));
                }
            }
        }

        let defaults = Scene::default();
        Ok(Scene {
            background: globals.background.unwrap_or(defaults.background),
            fps: globals.fps.unwrap_or(defaults.fps),
            duration_secs: globals.duration_secs.unwrap_or(defaults.duration_secs),
            canvas: globals.canvas.unwrap_or(defaults.canvas),
            objects,
            moves,
        })
    }

    /// `SHAPE (CIRCLE|RECT) ID <name> AT x,y (RADIUS r | WIDTH w HEIGHT h) COLOR #RRGGBB [movement]`
    fn parse_shape(&mut self, span: Span) -> Result<SceneObject, SyntaxError> {
        let is_circle = if self.consume_keyword(Keyword::Circle) {
            true
        } else if self.consume_keyword(Keyword::Rect) {
            false
        } else {
            return Err(self.error_here("shape type CIRCLE or RECT"));
        };

        self.expect_keyword(Keyword::Id)?;
        let id = self.parse_ident("object id")?;
        self.expect_keyword(Keyword::At)?;
        let position = self.parse_coord()?;

        let kind = if is_circle {
            self.expect_keyword(Keyword::Radius)?;
            ObjectKind::Circle {
                radius: self.parse_number("radius")?,
            }
        } else {
            self.expect_keyword(Keyword::Width)?;
            let width = self.parse_number("width")?;
            self.expect_keyword(Keyword::Height)?;
            let height = self.parse_number("height")?;
            ObjectKind::Rect { width, height }
        };

        self.expect_keyword(Keyword::Color)?;
        let color = self.parse_color()?;
        let movement = self.parse_inline_movement()?;

        Ok(SceneObject {
            id,
            position,
            color,
            kind,
            movement,
            span,
        })
    }

    /// `TEXT "<content>" [ID <name>] AT x,y SIZE <int> COLOR #RRGGBB [movement]`
    fn parse_text(&mut self, span: Span) -> Result<SceneObject, SyntaxError> {
        let t = self.bump();
        let TokenKind::Str(content) = &t.kind else {
            return Err(SyntaxError::new(
                t.span,
                format!("expected quoted text, found {}", t.kind.describe()),
            ));
        };
        let content = content.clone();

        let id = if self.consume_keyword(Keyword::Id) {
            self.parse_ident("object id")?
        } else {
            format!("text_{}", span.line)
        };

        self.expect_keyword(Keyword::At)?;
        let position = self.parse_coord()?;
        self.expect_keyword(Keyword::Size)?;
        let size = self.parse_uint("font size")?;
        self.expect_keyword(Keyword::Color)?;
        let color = self.parse_color()?;
        let movement = self.parse_inline_movement()?;

        Ok(SceneObject {
            id,
            position,
            color,
            kind: ObjectKind::Text { content, size },
            movement,
            span,
        })
    }

    /// `MOVE <id> TO x,y DUR <float> [EASE <kind>]`
    fn parse_move(
        &mut self,
        span: Span,
        declared_before: usize,
    ) -> Result<MoveDirective, SyntaxError> {
        let target_id = self.parse_ident("object id after MOVE")?;
        let movement = self.parse_movement_body()?;
        Ok(MoveDirective {
            target_id,
            movement,
            declared_before,
            span,
        })
    }

    /// `MOVE TO ...` directly after an object. A `MOVE` followed by anything other than `TO`
    /// starts the next (standalone) directive instead.
    fn parse_inline_movement(&mut self) -> Result<Option<Movement>, SyntaxError> {
        if !(self.at_keyword(Keyword::Move)
            && self.peek_nth(1).kind == TokenKind::Keyword(Keyword::To))
        {
            return Ok(None);
        }
        self.bump();
        self.parse_movement_body().map(Some)
    }

    fn parse_movement_body(&mut self) -> Result<Movement, SyntaxError> {
        self.expect_keyword(Keyword::To)?;
        let target = self.parse_coord()?;
        self.expect_keyword(Keyword::Dur)?;
        let duration_secs = self.parse_number("movement duration in seconds")?;
        let ease = if self.consume_keyword(Keyword::Ease) {
            let t = self.bump();
            let TokenKind::Ident(name) = &t.kind else {
                return Err(SyntaxError::new(
                    t.span,
                    format!("expected easing name, found {}", t.kind.describe()),
                ));
            };
            name.parse::<Ease>()
                .map_err(|e| SyntaxError::new(t.span, e.to_string()))?
        } else {
            Ease::Linear
        };
        Ok(Movement {
            target,
            duration_secs,
            ease,
        })
    }

    fn parse_ident(&mut self, what: &str) -> Result<String, SyntaxError> {
        match &self.peek().kind {
            TokenKind::Ident(s) => {
                let s = s.clone();
                self.bump();
                Ok(s)
            }
            _ => Err(self.error_here(what)),
        }
    }

    fn parse_color(&mut self) -> Result<String, SyntaxError> {
        match &self.peek().kind {
            TokenKind::Color(s) => {
                let s = s.clone();
                self.bump();
                Ok(s)
            }
            TokenKind::Ident(name) => Err(SyntaxError::new(
                self.peek().span,
                format!("invalid color '{name}': colors must be written as #RRGGBB"),
            )),
            _ => Err(self.error_here("color #RRGGBB")),
        }
    }

    fn parse_coord(&mut self) -> Result<Point, SyntaxError> {
        match self.peek().kind {
            TokenKind::Coord(x, y) => {
                self.bump();
                Ok(Point::new(x, y))
            }
            _ => Err(self.error_here("coordinates x,y")),
        }
    }

    fn parse_canvas(&mut self) -> Result<Canvas, SyntaxError> {
        let span = self.peek().span;
        let p = self.parse_coord()?;
        let dim = |v: f64| -> Result<u32, SyntaxError> {
            if v.fract() != 0.0 || v < 1.0 || v > f64::from(u32::MAX) {
                return Err(SyntaxError::new(
                    span,
                    "canvas size must be two positive integers",
                ));
            }
            Ok(v as u32)
        };
        Ok(Canvas {
            width: dim(p.x)?,
            height: dim(p.y)?,
        })
    }

    fn parse_number(&mut self, what: &str) -> Result<f64, SyntaxError> {
        match self.peek().kind {
            TokenKind::Number(v) => {
                self.bump();
                Ok(v)
            }
            _ => Err(self.error_here(what)),
        }
    }

    fn parse_uint(&mut self, what: &str) -> Result<u32, SyntaxError> {
        let t = self.peek();
        let TokenKind::Number(v) = t.kind else {
            return Err(self.error_here(what));
        };
        if t.lexeme.contains('.') || v < 0.0 || v > f64::from(u32::MAX) {
            return Err(SyntaxError::new(
                t.span,
                format!("expected {what} as a non-negative integer, found '{}'", t.lexeme),
            ));
        }
        self.bump();
        Ok(v as u32)
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, directive: &Token) -> Result<(), SyntaxError> {
    if slot.is_some() {
        return Err(SyntaxError::new(
            directive.span,
            format!("duplicate {} directive", directive.lexeme),
        ));
    }
    *slot = Some(value);
    Ok(())
}
