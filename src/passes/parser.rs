// This is the parser. yay.

use crate::{ast::*, span::Position, Token, TokenType};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ParseError {
    #[error("[ERROR] expected {expected}, got {got} at {at}")]
    Expected { expected: TokenType, got: TokenType, at: Position },
    #[error("[ERROR] unexpected {got} for {during} at {at}")]
    Unexpected { got: TokenType, during: &'static str, at: Position },
    #[error("[ERROR] {got} is not allowed at top level at {at}")]
    NotAllowedAtTopLevel { got: TokenType, at: Position },
    #[error("[ERROR] cannot declare nested function at {at}")]
    NestedFunction { at: Position },
    #[error("[ERROR] found unused identifier {name} at {at}")]
    UnusedIdentifier { name: String, at: Position },
    #[error("[ERROR] {feature} is not implemented yet at {at}")]
    Unimplemented { feature: &'static str, at: Position },
    #[error("[ERROR] tokens ended without EOF while parsing {during}")]
    MissingEof { during: &'static str },
}
impl ParseError {
    /// True for syntax that parses fine in principle but isn't supported yet
    pub fn is_unimplemented(&self) -> bool {
        matches!(self, Self::Unimplemented { .. })
    }
}

type Result<T> = std::result::Result<T, ParseError>;

/// Walks the tokens front to back with a single cursor, one token of
/// lookahead, no backtracking. One parser parses one token list
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
    /// Set when the first `>` of a `>>` closed a generic and the second
    /// one is still waiting to be consumed
    split_shift: bool,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        tokens.retain(|t| t.kind != TokenType::Comment);
        Self { tokens, index: 0, split_shift: false }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn peek_kind(&self) -> Option<TokenType> {
        self.peek().map(|t| t.kind)
    }

    /// Like peek, but running off the end is an error
    fn current(&self, during: &'static str) -> Result<&Token> {
        self.peek().ok_or(ParseError::MissingEof { during })
    }

    fn check(&self, kind: TokenType) -> bool {
        self.peek_kind() == Some(kind)
    }

    /// Only consumes if the next token is expected, then returns that token
    fn consume(&mut self, kind: TokenType, during: &'static str) -> Result<Token> {
        let token = self.current(during)?;
        if token.kind != kind {
            return Err(ParseError::Expected { expected: kind, got: token.kind, at: token.start() });
        }
        let token = token.clone();
        self.index += 1;
        Ok(token)
    }

    /// Consumes if the next token is `kind`, reporting whether it did
    fn eat(&mut self, kind: TokenType) -> bool {
        if self.check(kind) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn parse(mut self) -> Result<AST> {
        let mut ast = vec![];
        loop {
            let token = self.current("program")?;
            if token.kind == TokenType::Eof {
                self.index += 1;
                break;
            }
            ast.push(self.parse_top_level_statement()?);
        }
        debug!("parsed {} top level statements", ast.len());
        Ok(ast)
    }

    fn parse_top_level_statement(&mut self) -> Result<Statement> {
        let token = self.current("top level statement")?;
        match token.kind {
            TokenType::Function => Ok(Statement::Function(self.parse_function()?)),
            got => Err(ParseError::NotAllowedAtTopLevel { got, at: token.start() }),
        }
    }

    fn parse_function(&mut self) -> Result<Function> {
        let position = self.consume(TokenType::Function, "function")?.start();
        let name = self.consume(TokenType::Identifier, "function name")?.value;
        self.consume(TokenType::OpenParen, "function arguments")?;
        let mut arguments = vec![];
        if !self.check(TokenType::CloseParen) {
            loop {
                arguments.push(self.parse_argument()?);
                if !self.eat(TokenType::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenType::CloseParen, "function arguments")?;
        self.consume(TokenType::Colon, "function return type")?;
        let return_type = self.parse_type()?;
        let body = self.parse_block()?;
        debug!("parsed function {} ({} arguments, {} statements)", name, arguments.len(), body.body.len());
        Ok(Function { name, arguments, body, return_type, position })
    }

    fn parse_argument(&mut self) -> Result<Argument> {
        let name = self.consume(TokenType::Identifier, "argument")?.value;
        self.consume(TokenType::Colon, "argument type")?;
        let arg_type = self.parse_type()?;
        Ok(Argument { name, arg_type })
    }

    /// `*`? IDENTIFIER (`<` type `>`)? (`[` `]`)?
    fn parse_type(&mut self) -> Result<TypeSignature> {
        let position = self.current("type")?.start();
        let is_pointer = self.eat(TokenType::Asterisk);
        let type_name = self.consume(TokenType::Identifier, "type")?.value;
        let has_generic = self.eat(TokenType::OpenPointy);
        let generic_type = if has_generic {
            let generic = self.parse_type()?;
            self.close_generic()?;
            Some(Box::new(generic))
        } else {
            None
        };
        let is_array = self.eat(TokenType::OpenSquare);
        if is_array {
            self.consume(TokenType::CloseSquare, "array type")?;
        }
        Ok(TypeSignature {
            is_primitive: is_primitive(&type_name),
            type_name,
            is_pointer,
            is_array,
            has_generic,
            generic_type,
            position,
        })
    }

    /// The lexer reads `>>` as a shift, so `Vec<Vec<i32>>` needs it split
    /// back into two closing brackets
    fn close_generic(&mut self) -> Result<()> {
        let token = self.current("generic type")?;
        match token.kind {
            TokenType::ClosePointy => self.index += 1,
            TokenType::LogicRShift if !self.split_shift => self.split_shift = true,
            TokenType::LogicRShift => {
                self.split_shift = false;
                self.index += 1;
            }
            got => {
                return Err(ParseError::Expected {
                    expected: TokenType::ClosePointy,
                    got,
                    at: token.start(),
                })
            }
        }
        Ok(())
    }

    fn parse_block(&mut self) -> Result<Block> {
        let position = self.consume(TokenType::OpenCurly, "block")?.start();
        let mut body = vec![];
        while !self.check(TokenType::CloseCurly) {
            body.push(self.parse_local_statement()?);
        }
        self.consume(TokenType::CloseCurly, "block")?;
        Ok(Block { body, position })
    }

    fn parse_local_statement(&mut self) -> Result<Statement> {
        let token = self.current("statement")?;
        match token.kind {
            TokenType::Identifier => self.parse_identifier_statement(),
            TokenType::Return => Ok(Statement::Return(self.parse_return()?)),
            // functions are only reachable from the top level production
            TokenType::Function => Err(ParseError::NestedFunction { at: token.start() }),
            got => Err(ParseError::Unexpected { got, during: "statement", at: token.start() }),
        }
    }

    fn parse_return(&mut self) -> Result<Return> {
        let position = self.consume(TokenType::Return, "return statement")?.start();
        let value = self.parse_expression()?;
        self.consume(TokenType::Semi, "return statement")?;
        Ok(Return { value, position })
    }

    /// An identifier at the start of a statement can only be a call for now
    fn parse_identifier_statement(&mut self) -> Result<Statement> {
        let identifier = self.consume(TokenType::Identifier, "statement")?;
        let position = identifier.start();
        if let Some(Token { kind: TokenType::Assign, span, .. }) = self.peek() {
            return Err(ParseError::Unimplemented { feature: "assignment", at: span.start });
        }
        if !self.eat(TokenType::OpenParen) {
            return Err(ParseError::UnusedIdentifier { name: identifier.value, at: position });
        }
        let mut arguments = vec![];
        if !self.check(TokenType::CloseParen) {
            loop {
                arguments.push(self.parse_expression()?);
                if !self.eat(TokenType::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenType::CloseParen, "call arguments")?;
        self.consume(TokenType::Semi, "expression statement")?;
        let call = FunctionCall { function_name: identifier.value, arguments, position };
        Ok(Statement::ExpressionStatement(ExpressionStatement {
            expression: Expression::FunctionCall(call),
            position,
        }))
    }

    fn parse_expression(&mut self) -> Result<Expression> {
        let token = self.current("expression")?;
        match token.kind {
            TokenType::StringLiteral => {
                let token = self.consume(TokenType::StringLiteral, "string literal")?;
                Ok(Expression::StringLiteral(StringLiteral { value: token.value, position: token.span.start }))
            }
            TokenType::NumericLiteral => self.parse_numeric_expression(1),
            got => Err(ParseError::Unexpected { got, during: "expression", at: token.start() }),
        }
    }

    fn peek_binary_op(&self) -> Option<BinaryOp> {
        Some(match self.peek_kind()? {
            TokenType::Equals => BinaryOp::Equal,
            TokenType::OpenPointy => BinaryOp::Less,
            TokenType::ClosePointy => BinaryOp::Greater,
            TokenType::Add => BinaryOp::Plus,
            TokenType::Subtract => BinaryOp::Minus,
            TokenType::Asterisk => BinaryOp::Times,
            TokenType::Divide => BinaryOp::Divide,
            TokenType::Modulo => BinaryOp::Mod,
            _ => return None,
        })
    }

    /// Precedence climbing. Operators binding at least as tight as
    /// `min_precedence` are folded in here, the right hand side only takes
    /// strictly tighter ones so equal precedence associates to the left
    fn parse_numeric_expression(&mut self, min_precedence: u8) -> Result<Expression> {
        let mut left = self.parse_numeric_literal()?;
        while let Some(operator) = self.peek_binary_op() {
            let precedence = operator.precedence();
            if precedence < min_precedence {
                break;
            }
            self.index += 1;
            let right = self.parse_numeric_expression(precedence + 1)?;
            let position = left.position();
            left = Expression::BinaryExpression(Box::new(BinaryExpression { left, right, operator, position }));
        }
        Ok(left)
    }

    fn parse_numeric_literal(&mut self) -> Result<Expression> {
        let token = self.consume(TokenType::NumericLiteral, "numeric expression")?;
        Ok(Expression::NumericLiteral(NumericLiteral { value: token.value, position: token.span.start }))
    }
}

pub fn parse(tokens: Vec<Token>) -> Result<AST> {
    Parser::new(tokens).parse()
}
