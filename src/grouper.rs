use crate::ast::*;
use crate::config::Limits;
use crate::error::{CompileError, CompoundKind, ErrorKind};
use crate::lexer::{Token, TokenType};
use crate::range::Range;

/// Groups a token slice holding exactly one expression.
///
/// # Errors
/// Returns the first grouping error, or an error if tokens remain after the
/// expression.
pub fn group(tokens: &[Token]) -> Result<Expression, CompileError> {
    group_with(tokens, &Limits::default())
}

/// Like [`group`], with explicit limits.
///
/// # Errors
/// See [`group`].
pub fn group_with(tokens: &[Token], limits: &Limits) -> Result<Expression, CompileError> {
    let mut grouper = Grouper::new(tokens, limits);
    let expression = grouper.read_expression()?;
    if grouper.current().is_some() {
        return grouper.err_unexpected("the end of the expression");
    }
    Ok(expression)
}

/// A recursive descent reader that turns tokens into expressions, resolving
/// nested `( )`, `[ ]` and `{ }` structure. It also serves as the token
/// cursor of the statement parser.
#[derive(Debug)]
pub struct Grouper<'t> {
    tokens: &'t [Token],
    position: usize,
    depth: usize,
    max_depth: usize,
}

impl<'t> Grouper<'t> {
    pub fn new(tokens: &'t [Token], limits: &Limits) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
            max_depth: limits.max_nesting_depth,
        }
    }

    // === Expressions ===

    /// Expression ::= Reference | Literal
    pub fn read_expression(&mut self) -> Result<Expression, CompileError> {
        if self.depth >= self.max_depth {
            let range = self.current().map_or_else(|| self.eof_range(), |t| t.range);
            return Err(CompileError::new(
                ErrorKind::NestingTooDeep {
                    limit: self.max_depth,
                },
                range,
            ));
        }

        self.depth += 1;
        let expression = self.read_primary();
        self.depth -= 1;
        expression
    }

    fn read_primary(&mut self) -> Result<Expression, CompileError> {
        let Some(token) = self.current() else {
            return self.err_unexpected("an expression");
        };

        let value = match &token.ttype {
            TokenType::Identifier(name) => {
                self.advance();
                return self.read_reference(name.clone(), token.range);
            }
            TokenType::LParen => return self.read_group(token),
            TokenType::LBracket => return self.read_list(token),
            TokenType::LBrace => return self.read_block(token),
            TokenType::String(value) => NodeValue::String(value.clone()),
            TokenType::Number(value) => NodeValue::Number(*value),
            TokenType::Hex(value) => NodeValue::Hex(value.clone()),
            _ => return self.err_unexpected("an expression"),
        };

        self.advance();
        Ok(Expression::Literal(Literal {
            value,
            range: token.range,
        }))
    }

    /// Reference ::= Identifier { "." Identifier | "[" Expression "]" }
    fn read_reference(&mut self, name: String, start: Range) -> Result<Expression, CompileError> {
        let mut extenders = Vec::new();
        let mut end = start;

        loop {
            if self.match_token(&TokenType::Dot) {
                let dot = self.last_range();
                let (key, key_range) = self.expect_identifier("a property name after '.'")?;
                extenders.push(Extender::Accessor {
                    name: key,
                    range: dot.to(key_range),
                });
                end = key_range;
            } else if let Some(open) = self.current().filter(|t| t.ttype == TokenType::LBracket) {
                self.advance();
                let expression = self
                    .read_expression()
                    .map_err(|e| self.unclosed_on_eof(e, CompoundKind::Indexer, open))?;
                let close =
                    self.expect_within(CompoundKind::Indexer, open, &TokenType::RBracket, "']'")?;
                extenders.push(Extender::Indexer {
                    expression: Box::new(expression),
                    range: open.range.to(close.range),
                });
                end = close.range;
            } else {
                break;
            }
        }

        Ok(Expression::Reference(Reference {
            name,
            extenders,
            range: start.to(end),
        }))
    }

    /// Group ::= "(" Expression ")"
    fn read_group(&mut self, open: &'t Token) -> Result<Expression, CompileError> {
        self.advance();
        let expression = self
            .read_expression()
            .map_err(|e| self.unclosed_on_eof(e, CompoundKind::Group, open))?;
        let close = self.expect_within(CompoundKind::Group, open, &TokenType::RParen, "')'")?;

        Ok(Expression::Literal(Literal {
            value: NodeValue::Group(Box::new(expression)),
            range: open.range.to(close.range),
        }))
    }

    /// List ::= "[" [ Item { "," Item } ] "]"
    /// Item ::= Expression [ ( ".." | "..." ) Expression [ "^" Number ] [ ":" Identifier ] ]
    fn read_list(&mut self, open: &'t Token) -> Result<Expression, CompileError> {
        self.advance();
        let mut items = Vec::new();

        if self.match_token(&TokenType::RBracket) {
            return Ok(self.list_literal(items, open));
        }

        loop {
            if self.current().is_none() {
                return Err(self.unclosed(CompoundKind::List, open));
            }

            let expression = self
                .read_expression()
                .map_err(|e| self.unclosed_on_eof(e, CompoundKind::List, open))?;

            let Some(token) = self.current() else {
                return Err(self.unclosed(CompoundKind::List, open));
            };

            let item = match &token.ttype {
                TokenType::Comma | TokenType::RBracket => ListItem::Single(expression),
                TokenType::DoubleDot | TokenType::TripleDot => {
                    let inclusive = token.ttype == TokenType::DoubleDot;
                    self.advance();
                    ListItem::Range(self.read_range_item(expression, inclusive, open)?)
                }
                _ => return self.err_unexpected("',', ']' or a range operator"),
            };
            items.push(item);

            let Some(token) = self.current() else {
                return Err(self.unclosed(CompoundKind::List, open));
            };
            match &token.ttype {
                TokenType::Comma => {
                    self.advance();
                }
                TokenType::RBracket => {
                    self.advance();
                    return Ok(self.list_literal(items, open));
                }
                _ => return self.err_unexpected("',' or ']'"),
            }
        }
    }

    fn read_range_item(
        &mut self,
        from: Expression,
        inclusive: bool,
        open: &'t Token,
    ) -> Result<RangeItem, CompileError> {
        let to = self
            .read_expression()
            .map_err(|e| self.unclosed_on_eof(e, CompoundKind::List, open))?;

        let mut interpolation = Interpolation::default();

        if self.match_token(&TokenType::Caret) {
            match self.current() {
                Some(Token {
                    ttype: TokenType::Number(steps),
                    ..
                }) => {
                    interpolation.steps = Some(*steps);
                    self.advance();
                }
                Some(_) => return self.err_unexpected("a number of interpolation steps"),
                None => return Err(self.unclosed(CompoundKind::List, open)),
            }
        }

        if self.match_token(&TokenType::Colon) {
            let (mode, _) = self
                .expect_identifier("an interpolation mode")
                .map_err(|e| self.unclosed_on_eof(e, CompoundKind::List, open))?;
            interpolation.mode = Some(mode);
        }

        let range = from.range().to(self.last_range());
        Ok(RangeItem {
            from,
            to,
            inclusive,
            interpolation,
            range,
        })
    }

    fn list_literal(&self, items: Vec<ListItem>, open: &Token) -> Expression {
        Expression::Literal(Literal {
            value: NodeValue::List(items),
            range: open.range.to(self.last_range()),
        })
    }

    /// Block ::= "{" [ Property { ( "," | ";" ) Property } [ "," | ";" ] ] "}"
    /// Property ::= Identifier ":" Expression
    fn read_block(&mut self, open: &'t Token) -> Result<Expression, CompileError> {
        self.advance();
        let mut properties = Vec::new();

        loop {
            let Some(token) = self.current() else {
                return Err(self.unclosed(CompoundKind::Block, open));
            };

            if token.ttype == TokenType::RBrace {
                self.advance();
                return Ok(Expression::Literal(Literal {
                    value: NodeValue::Block(properties),
                    range: open.range.to(token.range),
                }));
            }

            let (key, key_range) = self.expect_identifier("a property key or '}'")?;
            self.expect_within(CompoundKind::Block, open, &TokenType::Colon, "':'")?;
            let expression = self
                .read_expression()
                .map_err(|e| self.unclosed_on_eof(e, CompoundKind::Block, open))?;

            properties.push(Property {
                key,
                range: key_range.to(expression.range()),
                expression,
            });

            let Some(token) = self.current() else {
                return Err(self.unclosed(CompoundKind::Block, open));
            };
            match &token.ttype {
                TokenType::Comma | TokenType::Semicolon => {
                    self.advance();
                }
                TokenType::RBrace => {} // Closed on the next iteration
                _ => return self.err_unexpected("',', ';' or '}'"),
            }
        }
    }

    // === Cursor Helper Methods ===

    pub fn current(&self) -> Option<&'t Token> {
        self.tokens.get(self.position)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn tokens(&self) -> &'t [Token] {
        self.tokens
    }

    /// Moves the cursor; used by the parser to recover after an error.
    pub fn seek(&mut self, position: usize) {
        self.position = position.min(self.tokens.len());
    }

    pub fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    /// The range of the last consumed token.
    pub fn last_range(&self) -> Range {
        self.position
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or_else(Range::default, |t| t.range)
    }

    pub fn check(&self, ttype: &TokenType) -> bool {
        self.current()
            .is_some_and(|t| std::mem::discriminant(&t.ttype) == std::mem::discriminant(ttype))
    }

    pub fn match_token(&mut self, ttype: &TokenType) -> bool {
        if self.check(ttype) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, ttype: &TokenType, expected: &str) -> Result<&'t Token, CompileError> {
        match self.current() {
            Some(token) if token.ttype == *ttype => {
                self.advance();
                Ok(token)
            }
            _ => self.err_unexpected(expected),
        }
    }

    pub fn expect_identifier(&mut self, expected: &str) -> Result<(String, Range), CompileError> {
        match self.current() {
            Some(Token {
                ttype: TokenType::Identifier(name),
                range,
            }) => {
                self.advance();
                Ok((name.clone(), *range))
            }
            _ => self.err_unexpected(expected),
        }
    }

    /// Expects `ttype` inside the compound opened by `open`; running out of
    /// tokens means the compound was never closed.
    fn expect_within(
        &mut self,
        kind: CompoundKind,
        open: &Token,
        ttype: &TokenType,
        expected: &str,
    ) -> Result<&'t Token, CompileError> {
        if self.current().is_none() {
            return Err(self.unclosed(kind, open));
        }
        self.expect(ttype, expected)
    }

    pub fn err_unexpected<T>(&self, expected: &str) -> Result<T, CompileError> {
        let error = match self.current() {
            Some(token) => CompileError::new(
                ErrorKind::Expected {
                    expected: expected.to_string(),
                    found: token.ttype.to_string(),
                },
                token.range,
            ),
            None => CompileError::new(
                ErrorKind::UnexpectedEof {
                    expected: expected.to_string(),
                },
                self.eof_range(),
            ),
        };
        Err(error)
    }

    fn eof_range(&self) -> Range {
        let end = self.tokens.last().map(|t| t.range.end).unwrap_or_default();
        Range::new(end, end)
    }

    fn unclosed(&self, kind: CompoundKind, open: &Token) -> CompileError {
        CompileError::new(ErrorKind::Unclosed(kind), open.range.to(self.last_range()))
    }

    fn unclosed_on_eof(&self, error: CompileError, kind: CompoundKind, open: &Token) -> CompileError {
        if matches!(error.kind, ErrorKind::UnexpectedEof { .. }) {
            self.unclosed(kind, open)
        } else {
            error
        }
    }
}
