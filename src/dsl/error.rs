use crate::dsl::lexer::Span;

/// A malformed token. Carries the offending lexeme and where it starts.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("lex error at {}:{}: {message} (near '{lexeme}')", span.line, span.column)]
pub struct LexError {
    /// Position of the first character of the offending lexeme.
    pub span: Span,
    /// The text that failed to lex.
    pub lexeme: String,
    /// Human-readable reason.
    pub message: String,
}

impl LexError {
    pub(crate) fn new(span: Span, lexeme: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            span,
            lexeme: lexeme.into(),
            message: message.into(),
        }
    }
}

/// A grammar violation at the given token.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("syntax error at {}:{}: {message}", span.line, span.column)]
pub struct SyntaxError {
    /// Position of the token that triggered the error.
    pub span: Span,
    /// Human-readable reason.
    pub message: String,
}

impl SyntaxError {
    pub(crate) fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}
