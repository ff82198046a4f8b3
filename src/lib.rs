//! Slate is a small, dynamically typed scripting language with lexical
//! scoping, first-class functions and single-inheritance classes. It runs as
//! a tree-walk interpreter with a hand-written recursive descent parser.
//!
//! ## Scanning
//! The first step is scanning, implemented in the [`scanner`] module: the
//! source text is turned into a flat list of [`Token`](token::Token)s ending
//! with an EOF sentinel. Problems at this stage are trivial ones like an
//! unterminated string or a stray character, reported as a
//! [`ScanError`](error::ScanError). Scanning keeps going after an error so
//! one run surfaces every bad character in the input.
//!
//! ## Parsing
//! The [`parser`] module turns the token list into an abstract syntax tree of
//! [`Expr`](expr::Expr)essions, which produce values, and
//! [`Stmt`](stmt::Stmt)ements, which have effects. Syntax errors become
//! [`ParseError`](error::ParseError)s; after one, the parser synchronizes at
//! the next statement boundary and keeps parsing, so several errors can be
//! reported in a single run. `for` loops have no tree node of their own; the
//! parser desugars them into `while` loops wrapped in blocks.
//!
//! ## Resolving
//! The [`resolver`] module makes a static pass over the tree, binding every
//! variable reference to the scope that declared it by recording how many
//! environments out the binding lives. This is what makes closures capture
//! the bindings in effect where a function was defined, not where it is
//! called. The pass also rejects code that is syntactically valid but
//! structurally wrong, like `return` at the top level or `this` outside of a
//! class, as [`ResolveError`](error::ResolveError)s.
//!
//! ## Interpreting
//! The [`interpreter`] module walks the tree and evaluates it against a chain
//! of [`Environment`](environment::Environment)s rooted in the globals.
//! Errors that only show up with live values, like adding a number to a
//! string or calling something that is not callable, are reported as
//! [`RuntimeError`](error::RuntimeError)s and abort the run.
//!
//! The driver keeps one interpreter alive for a whole session, so on the
//! interactive prompt variables, functions and classes defined on earlier
//! lines stay visible in later ones.

use std::io::Write;
use std::{fs, process};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub mod ast;
pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;

use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

/// The interpreter driver: runs script files and the interactive prompt.
///
/// Everything the program prints goes through the writer handed to [`new`];
/// tests pass a `Vec<u8>` to capture output, the binary passes stdout.
///
/// [`new`]: slate::new
#[allow(non_camel_case_types)]
pub struct slate<'a> {
    interpreter: Interpreter<'a>,
}

impl<'a> slate<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        slate {
            interpreter: Interpreter::new(out),
        }
    }

    /// Runs a script file to completion.
    /// Exits the process with 65 on a static error, 70 on a runtime error.
    pub fn run_file(&mut self, path: &str) {
        let source = fs::read_to_string(path).unwrap_or_else(|error| {
            eprintln!("Could not read '{path}': {error}");
            process::exit(66);
        });

        self.run(&source);

        if error::did_runtime_error() {
            process::exit(70);
        }
        if error::did_error() {
            process::exit(65);
        }
    }

    /// Runs an interactive prompt until end-of-input.
    ///
    /// Each line runs against the same interpreter, and the error flags are
    /// reset afterwards so a bad line does not take the session down with
    /// it. Line history is kept across sessions in `~/.slate_history`.
    pub fn run_prompt(&mut self) {
        let mut editor = DefaultEditor::new().expect("line editor to initialize");

        let history = home::home_dir().map(|dir| dir.join(".slate_history"));
        if let Some(history) = &history {
            // A missing history file is fine on the first run.
            let _ = editor.load_history(history);
        }

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    self.run(&line);
                    error::reset_error();
                },
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
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

    /// Runs a chunk of source through the pipeline. Each stage only runs if
    /// the previous ones reported no errors.
    fn run(&mut self, source: &str) {
        let tokens = Scanner::new(source).scan_tokens();

        if error::did_error() {
            return;
        }

        let statements = Parser::new(tokens).parse();

        if error::did_error() {
            return;
        }

        let mut resolver = Resolver::new(&mut self.interpreter);
        resolver.resolve(&statements);

        if error::did_error() {
            return;
        }

        self.interpreter.interpret(&statements);
    }
}
