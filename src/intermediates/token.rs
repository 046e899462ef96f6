//! A list of Tokens is the result of lexing, just chunked program data
//! with no regard for syntax. You're probably looking for [Token], not
//! TokenType, since you want that sweet location (span) data

use crate::span::{Position, Span};
use serde::Serialize;

/// The kind of token (Function, Identifier, Add, etc). Literal and
/// identifier text lives in [Token::value] so that this stays a plain tag
#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    // Declarations
    Function,
    Overload,
    Enum,
    Struct,
    Return,
    Const,
    Let,
    Unsafe,
    Declare,
    // Control flow
    If,
    Else,
    For,
    While,
    Continue,
    Break,
    // Modules
    Import,
    From,
    Export,
    Module,

    Identifier,

    OpenParen,
    CloseParen,
    OpenCurly,
    CloseCurly,
    OpenSquare,
    CloseSquare,
    OpenPointy,
    ClosePointy,
    Semi,
    Comma,
    Dot,
    Colon,
    QuestionMark,
    /// Multiplication or pointer, the parser decides
    Asterisk,

    StringLiteral,
    CharacterLiteral,
    NumericLiteral,
    BooleanLiteral,
    NullLiteral,

    Add,
    Subtract,
    Power,
    Divide,
    Modulo,

    Assign,
    AssignAdd,
    AssignSubtract,
    AssignMultiply,
    AssignDivide,
    AssignModulo,
    AssignSpaceship,
    AssignLogicAnd,
    AssignLogicOr,
    AssignLogicXor,
    AssignLogicLShift,
    AssignLogicRShift,

    Increase,
    Decrease,

    Equals,
    EqualsOrGreater,
    EqualsOrLess,
    NotEquals,
    And,
    Or,

    LogicAnd,
    LogicOr,
    LogicXor,
    LogicNot,
    LogicLShift,
    LogicRShift,

    /// Only emitted when the lexer is asked to keep comments
    Comment,
    Eof,
}

impl TokenType {
    /// Looks up the keyword table. `None` means plain identifier
    pub fn keyword(text: &str) -> Option<TokenType> {
        use TokenType::*;
        Some(match text {
            "function" => Function,
            "overload" => Overload,
            "enum" => Enum,
            "struct" => Struct,
            "return" => Return,
            "const" => Const,
            "let" => Let,
            "unsafe" => Unsafe,
            "declare" => Declare,
            "if" => If,
            "else" => Else,
            "for" => For,
            "while" => While,
            "continue" => Continue,
            "break" => Break,
            "import" => Import,
            "from" => From,
            "export" => Export,
            "module" => Module,
            "null" => NullLiteral,
            "true" | "false" => BooleanLiteral,
            _ => return None,
        })
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use TokenType::*;
        let s = match self {
            Function => "function",
            Overload => "overload",
            Enum => "enum",
            Struct => "struct",
            Return => "return",
            Const => "const",
            Let => "let",
            Unsafe => "unsafe",
            Declare => "declare",
            If => "if",
            Else => "else",
            For => "for",
            While => "while",
            Continue => "continue",
            Break => "break",
            Import => "import",
            From => "from",
            Export => "export",
            Module => "module",
            Identifier => "identifier",
            OpenParen => "(",
            CloseParen => ")",
            OpenCurly => "{",
            CloseCurly => "}",
            OpenSquare => "[",
            CloseSquare => "]",
            OpenPointy => "<",
            ClosePointy => ">",
            Semi => ";",
            Comma => ",",
            Dot => ".",
            Colon => ":",
            QuestionMark => "?",
            Asterisk => "*",
            StringLiteral => "string literal",
            CharacterLiteral => "character literal",
            NumericLiteral => "numeric literal",
            BooleanLiteral => "boolean literal",
            NullLiteral => "null",
            Add => "+",
            Subtract => "-",
            Power => "**",
            Divide => "/",
            Modulo => "%",
            Assign => "=",
            AssignAdd => "+=",
            AssignSubtract => "-=",
            AssignMultiply => "*=",
            AssignDivide => "/=",
            AssignModulo => "%=",
            AssignSpaceship => "<>",
            AssignLogicAnd => "&=",
            AssignLogicOr => "|=",
            AssignLogicXor => "^=",
            AssignLogicLShift => "<<=",
            AssignLogicRShift => ">>=",
            Increase => "++",
            Decrease => "--",
            Equals => "==",
            EqualsOrGreater => ">=",
            EqualsOrLess => "<=",
            NotEquals => "!=",
            And => "&&",
            Or => "||",
            LogicAnd => "&",
            LogicOr => "|",
            LogicXor => "^",
            LogicNot => "!",
            LogicLShift => "<<",
            LogicRShift => ">>",
            Comment => "comment",
            Eof => "end of file",
        };
        write!(f, "{}", s)
    }
}

/// All tokens have a location ([Token::span]) and a type ([Token::kind]).
/// `value` is the identifier/keyword text or the literal contents (escapes
/// already resolved), and empty for punctuation
#[derive(PartialEq, Eq, Clone, Debug, Serialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: TokenType,
    pub value: String,
    #[serde(flatten)]
    pub span: Span,
}
impl Token {
    pub fn new(kind: TokenType, value: impl Into<String>, span: Span) -> Self {
        Self { kind, value: value.into(), span }
    }
    pub fn start(&self) -> Position {
        self.span.start
    }
}
impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.value.is_empty() {
            write!(f, "{} at {}", self.kind, self.span)
        } else {
            write!(f, "{} {:?} at {}", self.kind, self.value, self.span)
        }
    }
}
