#[macro_use]
extern crate log;

use docopt::Docopt;
use otterc::{generate, parse, CompileError, Lexer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const USAGE: &str = "
otterc, the otter compiler. Lexes and parses one source file, dumping the
tokens and AST as JSON, and optionally generates IR from them.

Usage:
  otterc [options] [<file>]
  otterc (-h | --help)

Options:
  -h --help        Show this screen.
  --out <dir>      Directory for the dumps, emptied every run [default: out].
  --emit-ir        Run the generator too and write output.ll.
  --keep-comments  Keep comment tokens in tokenList.json.
  -v --verbose     Log at debug level (RUST_LOG still wins).
";

static DEFAULT_SOURCE: &str = "demos/hello_world.otter";

#[derive(Debug, Deserialize)]
struct Args {
    arg_file: Option<String>,
    flag_out: String,
    flag_emit_ir: bool,
    flag_keep_comments: bool,
    flag_verbose: bool,
}

#[derive(Debug, Error)]
enum DriverError {
    #[error("could not read {}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not write {}: {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },
    #[error("could not serialize {}: {source}", path.display())]
    Serialize { path: PathBuf, source: serde_json::Error },
    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Whether the run made it all the way to IR
enum Outcome {
    Generated,
    Skipped,
}

fn write_file(path: PathBuf, contents: &str) -> Result<(), DriverError> {
    std::fs::write(&path, contents).map_err(|source| DriverError::Write { path, source })
}

fn write_json<T: Serialize>(path: PathBuf, value: &T) -> Result<(), DriverError> {
    let json = match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(source) => return Err(DriverError::Serialize { path, source }),
    };
    write_file(path, &json)
}

fn reset_dir(dir: &Path) -> Result<(), DriverError> {
    let to_err = |source| DriverError::Write { path: dir.to_path_buf(), source };
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(to_err)?;
    }
    std::fs::create_dir_all(dir).map_err(to_err)
}

fn run(args: &Args) -> Result<Outcome, DriverError> {
    let source_path = PathBuf::from(args.arg_file.as_deref().unwrap_or(DEFAULT_SOURCE));
    let source = std::fs::read_to_string(&source_path)
        .map_err(|source| DriverError::Read { path: source_path.clone(), source })?;
    let out = Path::new(&args.flag_out);
    reset_dir(out)?;

    info!("Starting Lexer");
    let tokens = Lexer::new(&source)
        .keep_comments(args.flag_keep_comments)
        .lex()
        .map_err(CompileError::from)?;
    let token_path = out.join("tokenList.json");
    write_json(token_path.clone(), &tokens)?;
    info!("Completed Lexer, result can be found in {}", token_path.display());

    info!("Starting Parser");
    let ast = parse(tokens).map_err(CompileError::from)?;
    let ast_path = out.join("ast.json");
    write_json(ast_path.clone(), &ast)?;
    info!("Completed Parser, result can be found in {}", ast_path.display());

    if !args.flag_emit_ir {
        warn!("Skipping IR generation, pass --emit-ir to run the generator");
        return Ok(Outcome::Skipped);
    }

    info!("Starting Generator");
    let ir = generate(&ast).map_err(CompileError::from)?;
    let ir_path = out.join("output.ll");
    write_file(ir_path.clone(), &ir)?;
    info!("Completed Generator, result can be found in {}", ir_path.display());
    Ok(Outcome::Generated)
}

fn main() {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());
    let level = if args.flag_verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    debug!("{:?}", args);

    match run(&args) {
        Ok(Outcome::Generated) => (),
        Ok(Outcome::Skipped) => std::process::exit(1),
        Err(err) => {
            if let DriverError::Compile(compile) = &err {
                if compile.is_unimplemented() {
                    warn!("hit a feature the compiler doesn't support yet");
                }
            }
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}
