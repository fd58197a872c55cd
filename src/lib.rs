//! Shale is a small dynamically typed scripting language with lexical
//! scoping, first-class functions and single-inheritance classes. It runs
//! as a tree-walk interpreter with a hand-written recursive descent parser.
//!
//! ## Scanning
//! Scanning turns the source text into a list of tokens. The scanner is
//! implemented in the [`scanner`] module as an iterator over the characters
//! in the source code. Problems at this stage are trivial ones like an
//! unterminated string literal or an unrecognized character; they are
//! collected as [`ScanError`](error::ScanError)s and reported all at once,
//! so that several of them can be fixed in a single pass.
//!
//! ## Parsing
//! Parsing turns the token list into an abstract syntax tree. The parser is
//! implemented in the [`parser`] module as a recursive descent parser over
//! the grammar. [`Expressions`](expr::Expr) are pieces of code that produce
//! an [`Object`](object::Object); [`statements`](stmt::Stmt) perform an
//! action instead. On a syntax error the parser discards tokens until the
//! next statement boundary and keeps going, so a single run reports every
//! [`ParseError`](error::ParseError) it can find.
//!
//! ## Resolving
//! Resolving is a static pass over the tree that pins every variable
//! reference to the lexical scope it will read from at runtime. The depth
//! per reference ends up in a side table keyed by node identity; handing
//! that table to the interpreter is what keeps closures honest when later
//! declarations shadow a name. The pass also rejects the programs that are
//! syntactically fine but semantically wrong, like redeclaring a variable
//! in the same scope or returning a value from an initializer. See
//! [`resolver`].
//!
//! ## Interpreting
//! The interpreter in [`interpreter`] walks the tree and evaluates it,
//! carrying a chain of [`Environment`](environment::Environment) frames.
//! Most remaining problems surface here as
//! [`RuntimeError`](error::RuntimeError)s, type errors above all; operands
//! are checked eagerly before every operation. Output flows through the
//! [`Printer`](printer::Printer) sink, which is injectable so tests can
//! observe what a program prints.

use std::{fs, process};

pub mod error;
pub mod token;
pub mod literal;
pub mod scanner;
pub mod expr;
pub mod stmt;
pub mod ast;
pub mod parser;
pub mod resolver;
pub mod environment;
pub mod object;
pub mod function;
pub mod class;
pub mod interpreter;
pub mod printer;

use error::{CompileErrors, Error, ParseErrors, RuntimeError, ScanErrors};
use interpreter::Interpreter;
use object::Object;
use parser::Parser;
use printer::{FakePrinter, Printer};
use resolver::Bindings;
use scanner::Scanner;
use stmt::Stmt;
use token::Token;

/// Scans source text into tokens.
pub fn scan(source: &str) -> Result<Vec<Token>, ScanErrors> {
    Scanner::new(source).scan_tokens()
}

/// Parses tokens into a program.
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Stmt>, ParseErrors> {
    Parser::new(tokens).parse()
}

/// Resolves a program into its bindings table.
pub fn resolve(program: &[Stmt]) -> Result<Bindings, CompileErrors> {
    resolver::resolve(program)
}

/// Interprets a resolved program, writing output through the sink.
pub fn interpret(
    program: &[Stmt],
    bindings: Bindings,
    printer: &mut dyn Printer,
) -> Result<(), RuntimeError> {
    Interpreter::new(bindings, printer).interpret(program)
}

/// Runs source text front to back through the whole pipeline.
pub fn from_code(source: &str, printer: &mut dyn Printer) -> Result<(), Error> {
    let tokens = scan(source)?;
    let program = parse(tokens)?;
    let bindings = resolve(&program)?;
    interpret(&program, bindings, printer)?;

    Ok(())
}

/// Evaluates a single expression and returns its value. Output the
/// expression happens to produce is discarded.
pub fn evaluate_expression(source: &str) -> Result<Object, Error> {
    let expr = Parser::parse_expression(source)?;
    let program = [Stmt::Expression(stmt::ExpressionData { expr })];
    let bindings = resolve(&program)?;

    let Some(Stmt::Expression(data)) = program.first() else {
        unreachable!("program was built from a single expression statement");
    };

    let mut printer = FakePrinter::new();
    let mut interpreter = Interpreter::new(bindings, &mut printer);

    match interpreter.evaluate(&data.expr) {
        Ok(value) => Ok(value),
        Err(error::Unwind::Error(error)) => Err(error.into()),
        Err(error::Unwind::Return(value)) => Ok(value),
    }
}

/// The language front end used by the command line driver: runs files and
/// an interactive prompt against a single output sink.
#[allow(non_camel_case_types)]
pub struct shale<'a> {
    printer: &'a mut dyn Printer,
}

impl<'a> shale<'a> {
    pub fn new(printer: &'a mut dyn Printer) -> Self {
        shale { printer }
    }

    pub fn run_file(&mut self, path: &str) {
        let contents = fs::read_to_string(path)
            .expect("Should have been able to read the file");

        if let Err(error) = self.run(&contents) {
            eprintln!("{error}");

            match error {
                Error::Runtime(_) => process::exit(70),
                _ => process::exit(65),
            }
        }
    }

    pub fn run_prompt(&mut self) {
        let mut editor = match rustyline::DefaultEditor::new() {
            Ok(editor) => editor,
            Err(error) => {
                eprintln!("Could not start the prompt: {error}");
                process::exit(74);
            },
        };

        let history = home::home_dir().map(|dir| dir.join(".shale_history"));
        if let Some(history) = &history {
            // A missing history file just means a first run.
            let _ = editor.load_history(history);
        }

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(&line);

                    if let Err(error) = self.run(&line) {
                        eprintln!("{error}");
                    }
                },
                Err(rustyline::error::ReadlineError::Interrupted) => break,
                Err(rustyline::error::ReadlineError::Eof) => break,
                Err(error) => {
                    eprintln!("{error}");
                    break;
                },
            }
        }

        if let Some(history) = &history {
            let _ = editor.save_history(history);
        }
    }

    fn run(&mut self, source: &str) -> Result<(), Error> {
        from_code(source, self.printer)
    }
}
