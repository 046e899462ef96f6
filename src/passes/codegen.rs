//! Turns the AST into textual IR in the style of LLVM assembly.
//!
//! The output is every global addition (external declarations and string
//! constants) one per line, a blank line, then one `define` per top level
//! function. Only `printf` can be called, and it becomes a call to `puts`.

use crate::ast::*;
use crate::span::Position;
use indexmap::IndexSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum GenerateError {
    #[error("[ERROR] unexpected {kind} statement at {at}")]
    UnexpectedStatement { kind: &'static str, at: Position },
    #[error("[ERROR] unsupported function call to {name} at {at}")]
    UnsupportedCall { name: String, at: Position },
    #[error("[ERROR] could not map type {type_name} to an IR type at {at}")]
    UnsupportedType { type_name: String, at: Position },
    #[error("[ERROR] {feature} not implemented at {at}")]
    Unimplemented { feature: &'static str, at: Position },
    #[error("[ERROR] malformed numeric literal {value} at {at}")]
    MalformedNumber { value: String, at: Position },
}
impl GenerateError {
    /// Placeholders for language features that don't lower yet, as opposed
    /// to input that is actually wrong
    pub fn is_unimplemented(&self) -> bool {
        match self {
            Self::UnsupportedCall { .. } | Self::UnsupportedType { .. } | Self::Unimplemented { .. } => true,
            Self::UnexpectedStatement { .. } | Self::MalformedNumber { .. } => false,
        }
    }
}

type Result<T> = std::result::Result<T, GenerateError>;

static PUTS_DECLARATION: &str = "declare i32 @puts(ptr)";
static IMPLICIT_RETURN: &str = "ret i32 0";
static NAME_SYMBOLS: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Source type names with a fixed IR spelling. Primitives not in here pass
/// through as they are
static TYPE_MAP: &[(&str, &str)] = &[("string", "ptr")];

/// Hands out global names like spreadsheet columns, but over a-z then A-Z:
/// a, b, ..., Z, aa, ab, ... so no two calls ever give the same name
#[derive(Debug, Default)]
pub struct NameGenerator {
    counter: usize,
}
impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn next_name(&mut self) -> String {
        self.counter += 1;
        let base = NAME_SYMBOLS.len();
        let mut n = self.counter;
        let mut name = Vec::new();
        while n > 0 {
            n -= 1;
            name.push(NAME_SYMBOLS[n % base]);
            n /= base;
        }
        name.reverse();
        name.into_iter().map(char::from).collect()
    }
}

fn map_type(signature: &TypeSignature) -> Result<String> {
    let unsupported = || GenerateError::UnsupportedType {
        type_name: signature.to_string(),
        at: signature.position,
    };
    if signature.is_array || signature.has_generic {
        return Err(unsupported());
    }
    if signature.is_pointer {
        return Ok("ptr".to_string());
    }
    if let Some((_, ir)) = TYPE_MAP.iter().find(|(name, _)| *name == signature.type_name) {
        return Ok(ir.to_string());
    }
    if signature.is_primitive {
        Ok(signature.type_name.clone())
    } else {
        Err(unsupported())
    }
}

/// IR integers are plain decimal, so radix prefixed literals get converted.
/// Anything that doesn't fit an i32 is malformed, there are no wider operands
fn integer_literal(literal: &NumericLiteral) -> Result<String> {
    let value = &literal.value;
    let malformed = || GenerateError::MalformedNumber { value: value.clone(), at: literal.position };
    let parsed = if let Some(hex) = value.strip_prefix("0x") {
        i32::from_str_radix(hex, 16)
    } else if let Some(bin) = value.strip_prefix("0b") {
        i32::from_str_radix(bin, 2)
    } else if value.chars().all(|c| c.is_ascii_digit()) {
        value.parse()
    } else {
        return Err(GenerateError::Unimplemented {
            feature: "non-integer numeric literals",
            at: literal.position,
        });
    };
    parsed.map(|n| n.to_string()).map_err(|_| malformed())
}

/// Printable ASCII stays, everything else (and the quote and backslash) is
/// written as a \XX hex escape
fn escape_bytes(bytes: &[u8]) -> String {
    let mut escaped = String::with_capacity(bytes.len());
    for &byte in bytes {
        if byte == b'"' || byte == b'\\' || !(0x20..0x7f).contains(&byte) {
            escaped.push_str(&format!("\\{:02X}", byte));
        } else {
            escaped.push(char::from(byte));
        }
    }
    escaped
}

/// One generator generates one AST, `generate` consumes it
#[derive(Debug)]
pub struct Generator {
    /// Insertion ordered so output is deterministic
    globals: IndexSet<String>,
    names: NameGenerator,
}

impl Generator {
    pub fn new() -> Self {
        let mut globals = IndexSet::new();
        globals.insert(PUTS_DECLARATION.to_string());
        Self { globals, names: NameGenerator::new() }
    }

    pub fn generate(mut self, ast: &[Statement]) -> Result<String> {
        let mut body = String::new();
        for statement in ast {
            body.push_str(&self.generate_statement(statement)?);
            body.push('\n');
        }
        let mut out = String::new();
        for global in &self.globals {
            out.push_str(global);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&body);
        Ok(out)
    }

    fn generate_statement(&mut self, statement: &Statement) -> Result<String> {
        match statement {
            Statement::Function(function) => self.generate_function(function),
            other => self.generate_local_statement(other),
        }
    }

    fn generate_local_statement(&mut self, statement: &Statement) -> Result<String> {
        match statement {
            Statement::ExpressionStatement(statement) => self.generate_expression(&statement.expression),
            Statement::Return(ret) => Ok(format!("ret {}", self.generate_expression(&ret.value)?)),
            other => Err(GenerateError::UnexpectedStatement { kind: other.kind_name(), at: other.position() }),
        }
    }

    fn generate_function(&mut self, function: &Function) -> Result<String> {
        let return_type = map_type(&function.return_type)?;
        let arguments = function
            .arguments
            .iter()
            .map(|arg| Ok(format!("{} %{}", map_type(&arg.arg_type)?, arg.name)))
            .collect::<Result<Vec<String>>>()?;
        let mut lines = Vec::with_capacity(function.body.body.len() + 1);
        for statement in &function.body.body {
            lines.push(format!("  {}", self.generate_local_statement(statement)?));
        }
        if !function.has_explicit_return() {
            lines.push(format!("  {}", IMPLICIT_RETURN));
        }
        debug!("generated function {} ({} lines)", function.name, lines.len());
        Ok(format!(
            "define {} @{}({}) {{\n{}\n}}",
            return_type,
            function.name,
            arguments.join(", "),
            lines.join("\n")
        ))
    }

    fn generate_expression(&mut self, expression: &Expression) -> Result<String> {
        match expression {
            Expression::StringLiteral(literal) => Ok(self.string_constant(&literal.value)),
            Expression::NumericLiteral(literal) => Ok(format!("i32 {}", integer_literal(literal)?)),
            Expression::FunctionCall(call) => {
                if call.function_name != "printf" {
                    return Err(GenerateError::UnsupportedCall {
                        name: call.function_name.clone(),
                        at: call.position,
                    });
                }
                // puts is declared with exactly one ptr parameter
                match call.arguments.as_slice() {
                    [argument] => Ok(format!("call i32 @puts({})", self.generate_expression(argument)?)),
                    _ => Err(GenerateError::Unimplemented {
                        feature: "printf with other than one argument",
                        at: call.position,
                    }),
                }
            }
            Expression::BinaryExpression(binary) => {
                Err(GenerateError::Unimplemented { feature: "binary expressions", at: binary.position })
            }
        }
    }

    /// Adds a null terminated global for `value` and returns the operand
    /// pointing at it
    fn string_constant(&mut self, value: &str) -> String {
        let name = self.names.next_name();
        let bytes = value.as_bytes();
        let global = format!("@{} = constant [{} x i8] c\"{}\\00\"", name, bytes.len() + 1, escape_bytes(bytes));
        debug!("new global {}", global);
        self.globals.insert(global);
        format!("ptr @{}", name)
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn generate(ast: &[Statement]) -> Result<String> {
    Generator::new().generate(ast)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::passes::{lex, parse};

    fn generate_source(source: &str) -> Result<String> {
        let ast = parse(lex(source).expect("test source failed to lex")).expect("test source failed to parse");
        generate(&ast)
    }

    fn at(line: usize, column: usize, index: usize) -> Position {
        Position { line, column, index }
    }

    #[test]
    fn names_count_like_columns() {
        let mut names = NameGenerator::new();
        let first: Vec<String> = (0..54).map(|_| names.next_name()).collect();
        assert_eq!(first[0], "a");
        assert_eq!(first[25], "z");
        assert_eq!(first[26], "A");
        assert_eq!(first[51], "Z");
        assert_eq!(first[52], "aa");
        assert_eq!(first[53], "ab");
        // keep going past the two letter names
        let mut names = NameGenerator::new();
        let all: Vec<String> = (0..52 + 52 * 52 + 1).map(|_| names.next_name()).collect();
        assert_eq!(all[52 + 52 * 52 - 1], "ZZ");
        assert_eq!(all[52 + 52 * 52], "aaa");
        let unique: std::collections::HashSet<&String> = all.iter().collect();
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn hello_world() {
        let ir = generate_source("function main(): i32 { printf(\"hi\"); }").expect("generate failed");
        assert_eq!(
            ir,
            "declare i32 @puts(ptr)\n\
             @a = constant [3 x i8] c\"hi\\00\"\n\
             \n\
             define i32 @main() {\n  call i32 @puts(ptr @a)\n  ret i32 0\n}\n"
        );
    }

    #[test]
    fn explicit_return_and_arguments() {
        let ir = generate_source("function f(a: i32, s: string, p: *Thing): i64 { printf(\"x\"); return 7; }")
            .expect("generate failed");
        assert!(ir.contains("define i64 @f(i32 %a, ptr %s, ptr %p) {\n  call i32 @puts(ptr @a)\n  ret i32 7\n}"));
        assert!(!ir.contains("ret i32 0"));
    }

    #[test]
    fn globals_in_order_and_puts_once() {
        let ir = generate_source(
            "function first(): i32 { printf(\"one\"); }\nfunction second(): i32 { printf(\"two\"); printf(\"one\"); }",
        )
        .expect("generate failed");
        let preamble: Vec<&str> = ir.split("\n\n").next().map(|p| p.lines().collect()).unwrap_or_default();
        assert_eq!(
            preamble,
            vec![
                "declare i32 @puts(ptr)",
                "@a = constant [4 x i8] c\"one\\00\"",
                "@b = constant [4 x i8] c\"two\\00\"",
                "@c = constant [4 x i8] c\"one\\00\"",
            ]
        );
        assert_eq!(ir.matches("declare").count(), 1);
    }

    #[test]
    fn string_escapes() {
        let ir = generate_source("function m(): i32 { printf(\"say \\\"hi\\\"\\n\"); }").expect("generate failed");
        assert!(ir.contains("@a = constant [10 x i8] c\"say \\22hi\\22\\0A\\00\""));
        assert_eq!(escape_bytes("é\\".as_bytes()), "\\C3\\A9\\5C");
    }

    #[test]
    fn empty_program() {
        assert_eq!(generate(&[]).expect("generate failed"), "declare i32 @puts(ptr)\n\n");
    }

    #[test]
    fn binary_expressions_are_unimplemented() {
        let err = generate_source("function m(): i32 {\n  return 1+2;\n}").expect_err("should not generate");
        assert_eq!(err, GenerateError::Unimplemented { feature: "binary expressions", at: at(2, 9, 29) });
        assert!(err.is_unimplemented());
    }

    #[test]
    fn only_printf() {
        let err = generate_source("function m(): i32 { write(\"x\"); }").expect_err("should not generate");
        assert_eq!(err, GenerateError::UnsupportedCall { name: "write".to_string(), at: at(1, 20, 20) });
        assert!(err.is_unimplemented());
    }

    #[test]
    fn type_mapping() {
        let origin = Position::new();
        assert_eq!(map_type(&TypeSignature::named("string")), Ok("ptr".to_string()));
        assert_eq!(map_type(&TypeSignature::named("u8")), Ok("u8".to_string()));
        let mut pointer = TypeSignature::named("Thing");
        pointer.is_pointer = true;
        assert_eq!(map_type(&pointer), Ok("ptr".to_string()));
        assert_eq!(
            map_type(&TypeSignature::named("Thing")),
            Err(GenerateError::UnsupportedType { type_name: "Thing".to_string(), at: origin })
        );
        let mut array = TypeSignature::named("i32");
        array.is_array = true;
        assert_eq!(
            map_type(&array),
            Err(GenerateError::UnsupportedType { type_name: "i32[]".to_string(), at: origin })
        );
    }

    #[test]
    fn unsupported_types_point_at_the_type() {
        let err = generate_source("function m(v: Vec<i32>): i32 { }").expect_err("should not generate");
        assert_eq!(err, GenerateError::UnsupportedType { type_name: "Vec<i32>".to_string(), at: at(1, 14, 14) });
        let err = generate_source("function m(): i32 { }

function n(): *Thing[] { }").expect_err("should not generate");
        assert_eq!(err, GenerateError::UnsupportedType { type_name: "*Thing[]".to_string(), at: at(3, 14, 37) });
    }

    #[test]
    // A space separated list would not be valid IR, so arguments get commas
    fn arguments_are_comma_separated() {
        let ir = generate_source("function f(a: i32, b: i8, c: string): i32 { }").expect("generate failed");
        assert!(ir.contains("define i32 @f(i32 %a, i8 %b, ptr %c) {\n"));
    }

    #[test]
    fn printf_takes_one_argument() {
        for source in &["function m(): i32 { printf(); }", "function m(): i32 { printf(\"a\", \"b\"); }"] {
            let err = generate_source(source).expect_err("should not generate");
            assert_eq!(
                err,
                GenerateError::Unimplemented { feature: "printf with other than one argument", at: at(1, 20, 20) }
            );
            assert!(err.is_unimplemented());
        }
    }

    #[test]
    fn numeric_literals() {
        let ir = generate_source("function m(): i32 { return 0x10; }").expect("generate failed");
        assert!(ir.contains("  ret i32 16\n"));
        // e is a hex digit here, not an exponent
        let ir = generate_source("function m(): i32 { return 0x1e; }").expect("generate failed");
        assert!(ir.contains("  ret i32 30\n"));
        let ir = generate_source("function m(): i32 { return 0b101; }").expect("generate failed");
        assert!(ir.contains("  ret i32 5\n"));
        let err = generate_source("function m(): i32 { return 1.5; }").expect_err("should not generate");
        assert!(err.is_unimplemented());
        let err = generate_source("function m(): i32 { return 0b12; }").expect_err("should not generate");
        assert_eq!(err, GenerateError::MalformedNumber { value: "0b12".to_string(), at: at(1, 27, 27) });
        assert!(!err.is_unimplemented());
    }

    #[test]
    fn numeric_literals_fit_i32() {
        let ir = generate_source("function m(): i32 { return 2147483647; }").expect("generate failed");
        assert!(ir.contains("  ret i32 2147483647\n"));
        for value in &["2147483648", "99999999999", "0b100000000000000000000000000000000"] {
            let err = generate_source(&format!("function m(): i32 {{ return {}; }}", value))
                .expect_err("should not generate");
            assert_eq!(err, GenerateError::MalformedNumber { value: value.to_string(), at: at(1, 27, 27) });
        }
    }

    #[test]
    fn unexpected_statements() {
        let origin = Position::new();
        let block = Statement::Block(Block { body: vec![], position: origin });
        assert_eq!(
            generate(&[block]).expect_err("should not generate"),
            GenerateError::UnexpectedStatement { kind: "block", at: origin }
        );
        let import = Statement::Import(Import { namespace: "std".to_string(), position: origin });
        assert_eq!(
            generate(&[import]).expect_err("should not generate"),
            GenerateError::UnexpectedStatement { kind: "import", at: origin }
        );
    }
}
