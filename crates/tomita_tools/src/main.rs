//! Command-line driver for the tomita GLR engine.
//!
//! Parses an input file with a predefined grammar and prints the parse tree
//! (indented, symbol per line) or, with `--render`, source text
//! reconstructed from the tree's leaves. Exit code 0 on success, 1 on parse
//! failure or missing input.

mod cli;

use std::fs;
use std::process::ExitCode;

use clap::Parser;

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let invocation = match cli.resolve() {
        Ok(inv) => inv,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let source = match fs::read_to_string(&invocation.input) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("error: cannot read {}: {err}", invocation.input);
            return ExitCode::FAILURE;
        }
    };

    let mut engine = invocation.grammar.engine();
    let trees = match engine.parse(&source) {
        Ok(trees) => trees,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let Some(tree) = trees.first() else {
        eprintln!("error: no parse tree produced");
        return ExitCode::FAILURE;
    };
    if trees.len() > 1 {
        eprintln!("note: ambiguous input, {} parse trees (showing the first)", trees.len());
    }

    let rendered = if cli.render {
        let mut text = tree.render();
        text.push('\n');
        text
    } else {
        format!("{tree}")
    };

    match invocation.output {
        Some(path) => {
            if let Err(err) = fs::write(&path, rendered) {
                eprintln!("error: cannot write {path}: {err}");
                return ExitCode::FAILURE;
            }
        }
        None => print!("{rendered}"),
    }

    ExitCode::SUCCESS
}
