//! the Abstract Syntax Tree ([AST]) is the result of parsing, and contains
//! all the data in your program in actual logical chunks, most closely
//! resembling the frontend conceptual syntax.
//!
//! the actual AST is the [AST] type, which is just a list of top level
//! statements (for now, always functions). Just remember that these refer
//! to the **otter** language, not rust Functions or Blocks or anything.
//!
//! Every node records the [Position] of the first token it was built from.

use crate::span::Position;
use serde::Serialize;

/// An Abstract Syntax Tree
pub type AST = Vec<Statement>;

/// Type names the generator may pass straight through
pub const PRIMITIVE_TYPES: [&str; 11] =
    ["i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64", "f32", "f64", "bool"];

#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Statement {
    Block(Block),
    Function(Function),
    ExpressionStatement(ExpressionStatement),
    Return(Return),
    /// Not produced by the parser yet
    VarDecl(VarDecl),
    /// Not produced by the parser yet
    Import(Import),
}
impl Statement {
    pub fn position(&self) -> Position {
        match self {
            Self::Block(block) => block.position,
            Self::Function(function) => function.position,
            Self::ExpressionStatement(statement) => statement.position,
            Self::Return(ret) => ret.position,
            Self::VarDecl(decl) => decl.position,
            Self::Import(import) => import.position,
        }
    }
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Block(_) => "block",
            Self::Function(_) => "function",
            Self::ExpressionStatement(_) => "expression statement",
            Self::Return(_) => "return",
            Self::VarDecl(_) => "variable declaration",
            Self::Import(_) => "import",
        }
    }
}

#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub body: Vec<Statement>,
    pub position: Position,
}

/// Only legal at top level. The body is a block of local statements
#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    pub name: String,
    pub arguments: Vec<Argument>,
    pub body: Block,
    pub return_type: TypeSignature,
    pub position: Position,
}
impl Function {
    /// Only looks at direct children of the body
    pub fn has_explicit_return(&self) -> bool {
        self.body.body.iter().any(|s| matches!(s, Statement::Return(_)))
    }
}

#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Argument {
    pub name: String,
    #[serde(rename = "type")]
    pub arg_type: TypeSignature,
}

#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub position: Position,
}

#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Return {
    pub value: Expression,
    pub position: Position,
}

#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VarDecl {
    pub name: String,
    pub var_type: TypeSignature,
    pub value: Expression,
    pub position: Position,
}

#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Import {
    pub namespace: String,
    pub position: Position,
}

/// `*name<generic>[]`, each modifier optional. The modifiers only go one
/// level deep except through the generic parameter
#[derive(PartialEq, Eq, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSignature {
    pub type_name: String,
    pub is_pointer: bool,
    pub is_array: bool,
    pub has_generic: bool,
    pub generic_type: Option<Box<TypeSignature>>,
    pub is_primitive: bool,
    /// Where the type starts, the `*` if it has one
    pub position: Position,
}
impl TypeSignature {
    /// A bare type name with no modifiers, at the start of the file
    pub fn named(type_name: &str) -> Self {
        Self::named_at(type_name, Position::new())
    }
    pub fn named_at(type_name: &str, position: Position) -> Self {
        Self {
            type_name: type_name.to_string(),
            is_pointer: false,
            is_array: false,
            has_generic: false,
            generic_type: None,
            is_primitive: is_primitive(type_name),
            position,
        }
    }
}
impl std::fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.is_pointer {
            write!(f, "*")?;
        }
        write!(f, "{}", self.type_name)?;
        if let Some(generic) = &self.generic_type {
            write!(f, "<{}>", generic)?;
        }
        if self.is_array {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

pub fn is_primitive(type_name: &str) -> bool {
    PRIMITIVE_TYPES.contains(&type_name)
}

#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Expression {
    StringLiteral(StringLiteral),
    NumericLiteral(NumericLiteral),
    BinaryExpression(Box<BinaryExpression>),
    FunctionCall(FunctionCall),
}
impl Expression {
    pub fn position(&self) -> Position {
        match self {
            Self::StringLiteral(lit) => lit.position,
            Self::NumericLiteral(lit) => lit.position,
            Self::BinaryExpression(binary) => binary.position,
            Self::FunctionCall(call) => call.position,
        }
    }
}

#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StringLiteral {
    pub value: String,
    pub position: Position,
}

/// The literal text as lexed. Not validated beyond what the lexer checks
#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericLiteral {
    pub value: String,
    pub position: Position,
}

#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryExpression {
    pub left: Expression,
    pub right: Expression,
    pub operator: BinaryOp,
    pub position: Position,
}

#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCall {
    pub function_name: String,
    pub arguments: Vec<Expression>,
    pub position: Position,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize)]
pub enum BinaryOp {
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "*")]
    Times,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "%")]
    Mod,
}
impl BinaryOp {
    /// Higher binds tighter
    pub fn precedence(self) -> u8 {
        use BinaryOp::*;
        match self {
            Equal => 1,
            Less | Greater => 2,
            Plus | Minus => 3,
            Times | Divide | Mod => 4,
        }
    }
}
impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use BinaryOp::*;
        let s = match self {
            Equal => "==",
            Less => "<",
            Greater => ">",
            Plus => "+",
            Minus => "-",
            Times => "*",
            Divide => "/",
            Mod => "%",
        };
        write!(f, "{}", s)
    }
}
