use bumpalo::collections::Vec as ArenaVec;

use crate::arena::Arena;
use crate::error::{Error, ErrorCode};
use crate::position::Position;
use crate::token::{Token, TokenKind, LPAREN, QUOTE, RPAREN, SYMBOL_MAX_LEN};

/// Turns a source text into an arena-backed token sequence.
///
/// Whitespace separates tokens; parentheses and string quotes terminate any
/// buffered lexeme. A lexeme that parses entirely as a number becomes a
/// `Number` token, anything else up to 32 bytes becomes a `Symbol`.
pub fn tokenize<'a>(arena: &'a Arena, source: &str) -> Result<ArenaVec<'a, Token<'a>>, Error> {
    let mut lexer = Lexer {
        arena,
        tokens: ArenaVec::new_in(arena.bump()),
        buffer: String::new(),
        cursor: Position::new(1, 0),
        token_start: Position::default(),
    };
    lexer.run(source)?;
    Ok(lexer.tokens)
}

struct Lexer<'a> {
    arena: &'a Arena,
    tokens: ArenaVec<'a, Token<'a>>,
    buffer: String,
    cursor: Position,
    token_start: Position,
}

impl<'a> Lexer<'a> {
    fn run(&mut self, source: &str) -> Result<(), Error> {
        let mut chars = source.chars();

        while let Some(current) = chars.next() {
            self.cursor.column += 1;

            if current == LPAREN {
                self.tokens
                    .push(Token::new(TokenKind::LParen, self.cursor));
            } else if current == RPAREN {
                self.flush_buffer()?;
                self.tokens
                    .push(Token::new(TokenKind::RParen, self.cursor));
            } else if current == QUOTE {
                self.flush_buffer()?;
                self.string_literal(&mut chars)?;
            } else if current.is_ascii_whitespace() {
                if current == '\n' {
                    self.cursor.line += 1;
                    self.cursor.column = 0;
                }
                self.flush_buffer()?;
            } else if current.is_ascii_graphic() {
                if self.buffer.is_empty() {
                    self.token_start = self.cursor;
                }
                self.buffer.push(current);
            } else {
                return Err(Error::new(
                    ErrorCode::SyntaxUnexpectedToken,
                    Some(self.cursor),
                    format!("Unexpected token '{}'", current),
                ));
            }
        }

        self.flush_buffer()
    }

    /// Consumes a quoted string, the opening `"` already eaten. The token is
    /// positioned at the opening quote.
    fn string_literal(&mut self, chars: &mut std::str::Chars) -> Result<(), Error> {
        let start = self.cursor;
        let mut text = String::new();

        while let Some(current) = chars.next() {
            self.cursor.column += 1;

            match current {
                QUOTE => {
                    let token = Token::new(TokenKind::Str(self.arena.alloc_str(&text)), start);
                    self.tokens.push(token);
                    return Ok(());
                }
                '\\' => {
                    self.cursor.column += 1;
                    match chars.next() {
                        Some('"') => text.push('"'),
                        Some('\\') => text.push('\\'),
                        Some('n') => text.push('\n'),
                        Some('t') => text.push('\t'),
                        Some(other) => {
                            return Err(Error::new(
                                ErrorCode::SyntaxUnexpectedToken,
                                Some(self.cursor),
                                format!("Unknown escape sequence '\\{}'", other),
                            ));
                        }
                        None => break,
                    }
                }
                '\n' => {
                    self.cursor.line += 1;
                    self.cursor.column = 0;
                    text.push('\n');
                }
                _ => text.push(current),
            }
        }

        Err(Error::new(
            ErrorCode::SyntaxUnexpectedToken,
            Some(start),
            "Unterminated string literal".to_string(),
        ))
    }

    /// Emits the buffered lexeme, if any, as a number or symbol token.
    fn flush_buffer(&mut self) -> Result<(), Error> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let kind = if let Ok(number) = self.buffer.parse::<f64>() {
            TokenKind::Number(number)
        } else if self.buffer.len() <= SYMBOL_MAX_LEN {
            TokenKind::Symbol(self.arena.alloc_str(&self.buffer))
        } else {
            return Err(Error::new(
                ErrorCode::SyntaxUnexpectedToken,
                Some(self.token_start),
                format!(
                    "Token too long. Expected length <= {}, got {}",
                    SYMBOL_MAX_LEN,
                    self.buffer.len()
                ),
            ));
        };

        self.tokens.push(Token::new(kind, self.token_start));
        self.buffer.clear();
        Ok(())
    }
}
