// Hello, welcome to my lexer. Please like and subscribe

use crate::span::{Position, Span};
use crate::{Token, TokenType};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum LexError {
    #[error("[ERROR] unrecognized character {ch:?} at {at}")]
    UnrecognizedChar { ch: char, at: Position },
    #[error("[ERROR] unknown escape sequence '\\{escape}' in string at {at}")]
    UnknownEscape { escape: char, at: Position },
    #[error("[ERROR] unterminated string literal starting at {start}")]
    UnterminatedString { start: Position },
    #[error("[ERROR] file ended inside line comment starting at {start}")]
    UnterminatedLineComment { start: Position },
    #[error("[ERROR] unterminated block comment starting at {start}")]
    UnterminatedBlockComment { start: Position },
    #[error("[ERROR] unexpected end of block comment at {at}")]
    UnexpectedCommentEnd { at: Position },
    #[error("[ERROR] character literal must contain exactly one character at {at}")]
    InvalidCharacterLiteral { at: Position },
    #[error("[ERROR] numeric literal can only contain one exponent at {at}")]
    RepeatedExponent { at: Position },
    #[error("[ERROR] unexpected character {ch:?} in numeric literal at {at}")]
    UnexpectedNumericChar { ch: char, at: Position },
}

type Result<T> = std::result::Result<T, LexError>;

static WHITESPACE: &str = " \t\r\n";
static PARENS: &str = "(){}[]<>";
static SPECIAL: &str = "+-=.,*/%&|^:;?!'";

// Rules: A-Z,a-z
fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_id(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// . e b x can all show up inside a number, but only digits reach here first
fn is_numeric(c: char) -> bool {
    c.is_ascii_digit() || ".ebx".contains(c)
}

/// Turns source text into tokens. One lexer lexes one source, `lex`
/// consumes it
#[derive(Debug)]
pub struct Lexer {
    chars: Vec<char>,
    position: Position,
    tokens: Vec<Token>,
    keep_comments: bool,
}

impl Lexer {
    pub fn new(source: &str) -> Lexer {
        Lexer {
            chars: source.chars().collect(),
            position: Position::new(),
            tokens: Vec::new(),
            keep_comments: false,
        }
    }

    /// Comments are normally thrown away. With this they come out as
    /// [TokenType::Comment] tokens holding the comment text
    pub fn keep_comments(mut self, keep: bool) -> Self {
        self.keep_comments = keep;
        self
    }

    fn peek(&self) -> Option<char> {
        self.peek_n(0)
    }

    fn peek_n(&self, n: usize) -> Option<char> {
        self.chars.get(self.position.index + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        if c == '\n' {
            self.position.line += 1;
            self.position.column = 0;
        } else {
            self.position.column += 1;
        }
        self.position.index += 1;
        Some(c)
    }

    /// Advances only if the next char is `what`
    fn eat(&mut self, what: char) -> bool {
        if self.peek() == Some(what) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !WHITESPACE.contains(c) {
                break;
            }
            self.advance();
        }
    }

    fn token_from(&self, start: Position, kind: TokenType, value: impl Into<String>) -> Token {
        Token::new(kind, value, Span::new(start, self.position))
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.position;
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if !is_id(c) {
                break;
            }
            text.push(c);
            self.advance();
        }
        let kind = TokenType::keyword(&text).unwrap_or(TokenType::Identifier);
        self.token_from(start, kind, text)
    }

    fn read_string_literal(&mut self) -> Result<Token> {
        let start = self.position;
        // opening quote
        self.advance();
        let mut text = String::new();
        loop {
            match self.peek() {
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    let at = self.position;
                    self.advance();
                    let escaped = match self.peek() {
                        Some('"') => '"',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some(escape) => return Err(LexError::UnknownEscape { escape, at }),
                        None => return Err(LexError::UnterminatedString { start }),
                    };
                    text.push(escaped);
                    self.advance();
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
                None => return Err(LexError::UnterminatedString { start }),
            }
        }
        Ok(self.token_from(start, TokenType::StringLiteral, text))
    }

    fn read_paren(&mut self, first: char) -> Result<Token> {
        use TokenType::*;
        let start = self.position;
        self.advance();
        let kind = match first {
            '(' => OpenParen,
            ')' => CloseParen,
            '[' => OpenSquare,
            ']' => CloseSquare,
            '{' => OpenCurly,
            '}' => CloseCurly,
            '<' => {
                if self.eat('>') {
                    AssignSpaceship
                } else if self.eat('<') {
                    if self.eat('=') {
                        AssignLogicLShift
                    } else {
                        LogicLShift
                    }
                } else if self.eat('=') {
                    EqualsOrLess
                } else {
                    OpenPointy
                }
            }
            '>' => {
                if self.eat('>') {
                    if self.eat('=') {
                        AssignLogicRShift
                    } else {
                        LogicRShift
                    }
                } else if self.eat('=') {
                    EqualsOrGreater
                } else {
                    ClosePointy
                }
            }
            ch => return Err(LexError::UnrecognizedChar { ch, at: start }),
        };
        Ok(self.token_from(start, kind, ""))
    }

    /// Operators and punctuation. Comments also start here, which is why
    /// there might not be a token at the end of it
    fn read_special(&mut self, first: char) -> Result<Option<Token>> {
        use TokenType::*;
        let start = self.position;
        self.advance();
        let kind = match first {
            '+' => {
                if self.eat('=') {
                    AssignAdd
                } else if self.eat('+') {
                    Increase
                } else {
                    Add
                }
            }
            '-' => {
                if self.eat('=') {
                    AssignSubtract
                } else if self.eat('-') {
                    Decrease
                } else {
                    Subtract
                }
            }
            '/' => {
                if self.eat('/') {
                    return self.line_comment(start);
                } else if self.eat('*') {
                    return self.block_comment(start);
                } else if self.eat('=') {
                    AssignDivide
                } else {
                    Divide
                }
            }
            '*' => {
                if self.peek() == Some('/') {
                    return Err(LexError::UnexpectedCommentEnd { at: start });
                } else if self.eat('*') {
                    Power
                } else if self.eat('=') {
                    AssignMultiply
                } else {
                    Asterisk
                }
            }
            '%' => {
                if self.eat('=') {
                    AssignModulo
                } else {
                    Modulo
                }
            }
            '&' => {
                if self.eat('&') {
                    And
                } else if self.eat('=') {
                    AssignLogicAnd
                } else {
                    LogicAnd
                }
            }
            '|' => {
                if self.eat('|') {
                    Or
                } else if self.eat('=') {
                    AssignLogicOr
                } else {
                    LogicOr
                }
            }
            '^' => {
                if self.eat('=') {
                    AssignLogicXor
                } else {
                    LogicXor
                }
            }
            '!' => {
                if self.eat('=') {
                    NotEquals
                } else {
                    LogicNot
                }
            }
            '=' => {
                if self.eat('=') {
                    Equals
                } else {
                    Assign
                }
            }
            '\'' => return self.character_literal(start).map(Some),
            ':' => Colon,
            ';' => Semi,
            ',' => Comma,
            '.' => Dot,
            '?' => QuestionMark,
            ch => return Err(LexError::UnrecognizedChar { ch, at: start }),
        };
        Ok(Some(self.token_from(start, kind, "")))
    }

    /// The opening quote is already eaten
    fn character_literal(&mut self, start: Position) -> Result<Token> {
        let c = match self.peek() {
            Some(c) if c != '\'' => c,
            _ => return Err(LexError::InvalidCharacterLiteral { at: start }),
        };
        self.advance();
        if !self.eat('\'') {
            return Err(LexError::InvalidCharacterLiteral { at: start });
        }
        Ok(self.token_from(start, TokenType::CharacterLiteral, c.to_string()))
    }

    /// `//` is already eaten. Stops before the newline, and there has to be one
    fn line_comment(&mut self, start: Position) -> Result<Option<Token>> {
        let mut text = String::new();
        loop {
            match self.peek() {
                Some('\n') => break,
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
                None => return Err(LexError::UnterminatedLineComment { start }),
            }
        }
        Ok(self.comment(start, text))
    }

    /// `/*` is already eaten. Eats up to and including the `*/`
    fn block_comment(&mut self, start: Position) -> Result<Option<Token>> {
        let mut text = String::new();
        loop {
            match (self.peek(), self.peek_n(1)) {
                (Some('*'), Some('/')) => {
                    self.advance();
                    self.advance();
                    break;
                }
                (Some(c), _) => {
                    text.push(c);
                    self.advance();
                }
                (None, _) => return Err(LexError::UnterminatedBlockComment { start }),
            }
        }
        Ok(self.comment(start, text))
    }

    fn comment(&self, start: Position, text: String) -> Option<Token> {
        if self.keep_comments {
            Some(self.token_from(start, TokenType::Comment, text))
        } else {
            None
        }
    }

    /// Permissive on purpose: digits and dots anywhere, one exponent, a
    /// sign right after the exponent, and a b/x radix mark after a leading 0
    fn read_numeric_literal(&mut self) -> Result<Token> {
        let start = self.position;
        let mut text = String::new();
        let mut had_e = false;
        while let Some(c) = self.peek() {
            match c {
                'e' => {
                    if had_e {
                        return Err(LexError::RepeatedExponent { at: self.position });
                    }
                    had_e = true;
                }
                'b' | 'x' => {
                    if text != "0" {
                        return Err(LexError::UnexpectedNumericChar { ch: c, at: self.position });
                    }
                }
                // a sign anywhere else is the next operator
                '+' | '-' if !text.ends_with('e') => break,
                '+' | '-' => (),
                c if is_numeric(c) => (),
                _ => break,
            }
            text.push(c);
            self.advance();
        }
        Ok(self.token_from(start, TokenType::NumericLiteral, text))
    }

    pub fn lex(mut self) -> Result<Vec<Token>> {
        loop {
            self.skip_whitespace();
            let c = match self.peek() {
                Some(c) => c,
                // Only whitespace left (or nothing), which is a fine place to end
                None => break,
            };
            let token = if is_alpha(c) || c == '_' {
                Some(self.read_identifier())
            } else if c == '"' {
                Some(self.read_string_literal()?)
            } else if PARENS.contains(c) {
                Some(self.read_paren(c)?)
            } else if SPECIAL.contains(c) {
                self.read_special(c)?
            } else if is_numeric(c) {
                Some(self.read_numeric_literal()?)
            } else {
                return Err(LexError::UnrecognizedChar { ch: c, at: self.position });
            };
            if let Some(token) = token {
                trace!("{}", token);
                self.tokens.push(token);
            }
        }
        self.tokens.push(Token::new(TokenType::Eof, "", Span::point(self.position)));
        debug!("lexed {} tokens", self.tokens.len());
        Ok(self.tokens)
    }
}

pub fn lex(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).lex()
}

#[cfg(test)]
mod test {
    use super::*;
    use TokenType::*;

    fn kinds(source: &str) -> Vec<TokenType> {
        lex(source).expect("test source failed to lex").iter().map(|t| t.kind).collect()
    }

    fn at(line: usize, column: usize, index: usize) -> Position {
        Position { line, column, index }
    }

    #[test]
    fn hello_world() {
        let lexed = lex("function main(): i32 { printf(\"hi\"); }").expect("lex failed");
        let kinds: Vec<TokenType> = lexed.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                Function, Identifier, OpenParen, CloseParen, Colon, Identifier, OpenCurly,
                Identifier, OpenParen, StringLiteral, CloseParen, Semi, CloseCurly, Eof,
            ]
        );
        assert_eq!(lexed[1].value, "main");
        assert_eq!(lexed[5].value, "i32");
        assert_eq!(lexed[9].value, "hi");
        assert_eq!(lexed[4].value, "");
    }

    #[test]
    fn positions() {
        let lexed = lex("let x\n  y").expect("lex failed");
        assert_eq!(lexed[0].span, Span::new(at(1, 0, 0), at(1, 3, 3)));
        assert_eq!(lexed[1].span, Span::new(at(1, 4, 4), at(1, 5, 5)));
        assert_eq!(lexed[2].span, Span::new(at(2, 2, 8), at(2, 3, 9)));
        assert_eq!(lexed[3].kind, Eof);
        assert_eq!(lexed[3].span, Span::point(at(2, 3, 9)));
    }

    #[test]
    fn keywords_and_literals() {
        assert_eq!(
            kinds("return const unsafe declare import from export module null true false"),
            vec![
                Return, Const, Unsafe, Declare, Import, From, Export, Module, NullLiteral,
                BooleanLiteral, BooleanLiteral, Eof,
            ]
        );
        assert_eq!(kinds("functions _x x_1"), vec![Identifier, Identifier, Identifier, Eof]);
    }

    #[test]
    fn operators() {
        assert_eq!(
            kinds("+ += ++ - -= -- * ** *= / /= % %= & && &= | || |= ^ ^= ! != = =="),
            vec![
                Add, AssignAdd, Increase, Subtract, AssignSubtract, Decrease, Asterisk, Power,
                AssignMultiply, Divide, AssignDivide, Modulo, AssignModulo, LogicAnd, And,
                AssignLogicAnd, LogicOr, Or, AssignLogicOr, LogicXor, AssignLogicXor, LogicNot,
                NotEquals, Assign, Equals, Eof,
            ]
        );
        assert_eq!(
            kinds("< <= << <<= <> > >= >> >>= : ; , . ?"),
            vec![
                OpenPointy, EqualsOrLess, LogicLShift, AssignLogicLShift, AssignSpaceship,
                ClosePointy, EqualsOrGreater, LogicRShift, AssignLogicRShift, Colon, Semi, Comma,
                Dot, QuestionMark, Eof,
            ]
        );
        assert_eq!(kinds("({[]})"), vec![OpenParen, OpenCurly, OpenSquare, CloseSquare, CloseCurly, CloseParen, Eof]);
    }

    #[test]
    fn string_escapes() {
        let lexed = lex(r#""a\"b\nc\rd""#).expect("lex failed");
        assert_eq!(lexed[0].value, "a\"b\nc\rd");
        let err = lex(r#""a\tb""#).expect_err("tab escape should not lex");
        assert_eq!(err, LexError::UnknownEscape { escape: 't', at: at(1, 2, 2) });
    }

    #[test]
    fn unterminated_string() {
        let err = lex("x \"never closed").expect_err("should not lex");
        assert_eq!(err, LexError::UnterminatedString { start: at(1, 2, 2) });
    }

    #[test]
    fn comments_are_dropped() {
        assert_eq!(kinds("a // line\nb /* block\n * still */ c"), vec![Identifier, Identifier, Identifier, Eof]);
        let lexed = Lexer::new("/* one\ntwo */ x // three\n").keep_comments(true).lex().expect("lex failed");
        let kinds: Vec<TokenType> = lexed.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![Comment, Identifier, Comment, Eof]);
        assert_eq!(lexed[0].value, " one\ntwo ");
        assert_eq!(lexed[2].value, " three");
        // block comments keep line counting straight
        assert_eq!(lexed[1].span.start, at(2, 7, 14));
    }

    #[test]
    fn comment_errors() {
        assert_eq!(
            lex("a /* forever").expect_err("should not lex"),
            LexError::UnterminatedBlockComment { start: at(1, 2, 2) }
        );
        assert_eq!(
            lex("a // no newline").expect_err("should not lex"),
            LexError::UnterminatedLineComment { start: at(1, 2, 2) }
        );
        assert_eq!(lex("a */").expect_err("should not lex"), LexError::UnexpectedCommentEnd { at: at(1, 2, 2) });
    }

    #[test]
    fn character_literals() {
        let lexed = lex("'a' '?'").expect("lex failed");
        assert_eq!(lexed[0].kind, CharacterLiteral);
        assert_eq!(lexed[0].value, "a");
        assert_eq!(lexed[1].value, "?");
        assert_eq!(lex("'ab'").expect_err("should not lex"), LexError::InvalidCharacterLiteral { at: at(1, 0, 0) });
        assert_eq!(lex("''").expect_err("should not lex"), LexError::InvalidCharacterLiteral { at: at(1, 0, 0) });
    }

    #[test]
    fn numeric_literals() {
        let lexed = lex("42 3.14 1e10 2e-3 0x1e 0b101").expect("lex failed");
        let values: Vec<&str> = lexed.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["42", "3.14", "1e10", "2e-3", "0x1e", "0b101", ""]);
        assert!(lexed[..6].iter().all(|t| t.kind == NumericLiteral));
        // signs not following an exponent are operators
        assert_eq!(kinds("1+2*3"), vec![NumericLiteral, Add, NumericLiteral, Asterisk, NumericLiteral, Eof]);
    }

    #[test]
    // only digits and the b/x/e/. marks continue a number, so hex letters
    // past e start an identifier
    fn hex_letters_end_the_number() {
        let lexed = lex("0x1F").expect("lex failed");
        let pairs: Vec<(TokenType, &str)> = lexed.iter().map(|t| (t.kind, t.value.as_str())).collect();
        assert_eq!(pairs, vec![(NumericLiteral, "0x1"), (Identifier, "F"), (Eof, "")]);
        assert_eq!(lex("0xee").expect_err("should not lex"), LexError::RepeatedExponent { at: at(1, 3, 3) });
    }

    #[test]
    fn numeric_errors() {
        assert_eq!(lex("1e2e3").expect_err("should not lex"), LexError::RepeatedExponent { at: at(1, 3, 3) });
        assert_eq!(
            lex("12x4").expect_err("should not lex"),
            LexError::UnexpectedNumericChar { ch: 'x', at: at(1, 2, 2) }
        );
    }

    #[test]
    fn unrecognized_char() {
        assert_eq!(lex("a @").expect_err("should not lex"), LexError::UnrecognizedChar { ch: '@', at: at(1, 2, 2) });
        assert_eq!(lex("ünicode").expect_err("should not lex"), LexError::UnrecognizedChar { ch: 'ü', at: at(1, 0, 0) });
    }

    #[test]
    fn trailing_whitespace_and_empty() {
        assert_eq!(kinds("x \n\t "), vec![Identifier, Eof]);
        let lexed = lex("").expect("lex failed");
        assert_eq!(lexed, vec![Token::new(Eof, "", Span::point(at(1, 0, 0)))]);
    }

    #[test]
    fn spans_rebuild_source() {
        let source = "function add(a: i32, b: *Vec<u8>[]): i32 {\n  // nothing here\n  return 1+2 *3;\n}\n";
        let lexed = lex(source).expect("lex failed");
        let rebuilt: String = lexed.iter().map(|t| t.span.text(source)).collect();
        let expected: String = source
            .replace("// nothing here", "")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        assert_eq!(rebuilt, expected);
        // indices never go backwards, and EOF sits at the very end
        for pair in lexed.windows(2) {
            assert!(pair[0].span.end.index <= pair[1].span.start.index);
        }
        assert_eq!(lexed.last().map(|t| t.span.start.index), Some(source.chars().count()));
    }
}
