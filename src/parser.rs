use crate::ast::*;
use crate::config::Limits;
use crate::error::{CompileError, ErrorKind};
use crate::grouper::Grouper;
use crate::lexer::{Token, TokenType};

/// Everything the parser collected: the binding table and the definitions
/// in source order, both still unresolved.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParseOutput {
    pub bindings: Bindings,
    pub definitions: Vec<UnresolvedDefinition>,
}

/// Parses a token stream into bindings and definitions. A failing statement
/// is recorded and skipped; parsing always continues to the end.
pub fn parse(tokens: &[Token]) -> (ParseOutput, Vec<CompileError>) {
    parse_with(tokens, &Limits::default())
}

/// Like [`parse`], with explicit limits.
pub fn parse_with(tokens: &[Token], limits: &Limits) -> (ParseOutput, Vec<CompileError>) {
    Parser::new(tokens, limits).parse()
}

const STATEMENT_KEYWORDS: [&str; 3] = ["let", "theme", "font"];

fn starts_statement(ttype: &TokenType) -> bool {
    STATEMENT_KEYWORDS.iter().any(|k| ttype.is_keyword(k))
}

/// A statement-level recursive descent parser. Expressions are read by the
/// [`Grouper`], which shares the parser's token cursor.
#[derive(Debug)]
pub struct Parser<'t> {
    grouper: Grouper<'t>,
    output: ParseOutput,
    errors: Vec<CompileError>,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token], limits: &Limits) -> Self {
        Self {
            grouper: Grouper::new(tokens, limits),
            output: ParseOutput::default(),
            errors: Vec::new(),
        }
    }

    ///    Document ::= { Statement }
    pub fn parse(mut self) -> (ParseOutput, Vec<CompileError>) {
        while self.grouper.current().is_some() {
            let start = self.grouper.position();
            if let Err(error) = self.parse_statement() {
                log::trace!("abandoning statement at token {start}: {error}");
                self.errors.push(error);
                self.recover(start);
            }
        }

        log::debug!(
            "parsed {} bindings and {} definitions with {} errors",
            self.output.bindings.len(),
            self.output.definitions.len(),
            self.errors.len()
        );
        (self.output, self.errors)
    }

    /// Statement ::= Binding | ThemeDefinition | FontDefinition
    fn parse_statement(&mut self) -> Result<(), CompileError> {
        let Some(token) = self.grouper.current() else {
            return Ok(());
        };

        match &token.ttype {
            TokenType::Identifier(word) if word == "let" => self.parse_binding(),
            TokenType::Identifier(word) if word == "theme" => {
                self.parse_definition(DefinitionKind::Theme)
            }
            TokenType::Identifier(word) if word == "font" => {
                self.parse_definition(DefinitionKind::Font)
            }
            other => Err(CompileError::new(
                ErrorKind::UnknownInstruction {
                    found: other.to_string(),
                },
                token.range,
            )),
        }
    }

    /// Binding ::= "let" Identifier ":" Expression ";"
    fn parse_binding(&mut self) -> Result<(), CompileError> {
        self.grouper.advance(); // Consume the keyword
        let start = self.grouper.last_range();
        let (name, name_range) = self.grouper.expect_identifier("a binding name")?;
        self.grouper.expect(&TokenType::Colon, "':'")?;
        let expression = self.grouper.read_expression()?;
        let end = self.grouper.expect(&TokenType::Semicolon, "';'")?;

        // The statement is complete, so a redeclaration needs no recovery.
        if self.output.bindings.contains_key(&name) {
            self.errors.push(CompileError::new(
                ErrorKind::Redeclaration { name },
                name_range,
            ));
            return Ok(());
        }

        log::trace!("binding '{name}'");
        self.output.bindings.insert(
            name.clone(),
            Binding {
                name,
                expression,
                range: start.to(end.range),
            },
        );
        Ok(())
    }

    /// ThemeDefinition ::= "theme" Identifier ":" Block ";"
    /// FontDefinition ::= "font" Identifier ":" Block [ "from" String ] ";"
    fn parse_definition(&mut self, kind: DefinitionKind) -> Result<(), CompileError> {
        self.grouper.advance(); // Consume the keyword
        let start = self.grouper.last_range();
        let (name, _) = self
            .grouper
            .expect_identifier(&format!("a {} name", kind.as_str()))?;
        self.grouper.expect(&TokenType::Colon, "':'")?;
        let body = self.grouper.read_expression()?;

        if !body.is_block_literal() {
            return Err(CompileError::new(
                ErrorKind::ExpectedBlockLiteral,
                body.range(),
            ));
        }

        let mut source = None;
        if kind == DefinitionKind::Font
            && self
                .grouper
                .current()
                .is_some_and(|t| t.ttype.is_keyword("from"))
        {
            self.grouper.advance();
            match self.grouper.current() {
                Some(Token {
                    ttype: TokenType::String(path),
                    ..
                }) => {
                    source = Some(path.clone());
                    self.grouper.advance();
                }
                _ => return self.grouper.err_unexpected("a string literal after 'from'"),
            }
        }

        let end = self.grouper.expect(&TokenType::Semicolon, "';'")?;

        log::trace!("{} definition '{name}'", kind.as_str());
        self.output.definitions.push(UnresolvedDefinition {
            kind,
            name,
            body,
            source,
            range: start.to(end.range),
        });
        Ok(())
    }

    /// Skips the rest of a failed statement. Scanning starts at the statement
    /// start and stops after the first `;` outside any brackets, after a
    /// nested `;` that is directly followed by a statement keyword, or before
    /// a statement keyword outside any brackets at or past the failure point.
    fn recover(&mut self, start: usize) {
        let failed_at = self.grouper.position();
        let tokens = self.grouper.tokens();
        let mut depth: i64 = 0;
        let mut index = start + 1;

        while let Some(token) = tokens.get(index) {
            match &token.ttype {
                TokenType::LParen | TokenType::LBracket | TokenType::LBrace => depth += 1,
                TokenType::RParen | TokenType::RBracket | TokenType::RBrace => depth -= 1,
                TokenType::Semicolon => {
                    let keyword_follows = tokens
                        .get(index + 1)
                        .is_some_and(|next| starts_statement(&next.ttype));
                    if depth <= 0 || keyword_follows {
                        index += 1;
                        break;
                    }
                }
                ttype if depth <= 0 && index >= failed_at && starts_statement(ttype) => break,
                _ => {}
            }
            index += 1;
        }

        self.grouper.seek(index);
    }
}
