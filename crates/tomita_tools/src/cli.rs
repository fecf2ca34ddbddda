//! CLI argument surface for the tomita driver.

use clap::Parser;
use tomita::GrammarKind;

/// Parse a source file with one of the predefined grammars.
#[derive(Parser)]
#[command(name = "tomita")]
#[command(about = "GLR parser driver")]
#[command(version)]
pub struct Cli {
    /// Print reconstructed source instead of the parse tree
    #[arg(short, long)]
    pub render: bool,

    /// [grammar_type] <input_file> [output_file]
    ///
    /// grammar_type is one of: lua, math, simple, programming (default lua)
    #[arg(value_name = "ARGS", required = true, num_args = 1..=3)]
    pub args: Vec<String>,
}

/// The fully-resolved invocation.
pub struct Invocation {
    pub grammar: GrammarKind,
    pub input: String,
    pub output: Option<String>,
}

impl Cli {
    /// Interpret the positional arguments: a leading grammar name is
    /// optional and defaults to `lua`.
    pub fn resolve(&self) -> Result<Invocation, String> {
        let mut rest = self.args.as_slice();
        let grammar = match rest[0].parse::<GrammarKind>() {
            Ok(kind) if rest.len() >= 2 => {
                rest = &rest[1..];
                kind
            }
            _ => GrammarKind::Lua,
        };
        match rest {
            [input] => Ok(Invocation {
                grammar,
                input: input.clone(),
                output: None,
            }),
            [input, output] => Ok(Invocation {
                grammar,
                input: input.clone(),
                output: Some(output.clone()),
            }),
            _ => Err("usage: tomita [--render] [grammar_type] <input_file> [output_file]".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tomita").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn grammar_defaults_to_lua() {
        let inv = cli(&["script.lua"]).resolve().unwrap();
        assert_eq!(inv.grammar, GrammarKind::Lua);
        assert_eq!(inv.input, "script.lua");
        assert!(inv.output.is_none());
    }

    #[test]
    fn explicit_grammar_and_output() {
        let inv = cli(&["math", "expr.txt", "out.txt"]).resolve().unwrap();
        assert_eq!(inv.grammar, GrammarKind::Math);
        assert_eq!(inv.output.as_deref(), Some("out.txt"));
    }

    #[test]
    fn grammar_name_alone_is_an_input_path() {
        // A single positional is always the input file, even if it happens
        // to spell a grammar name.
        let inv = cli(&["math"]).resolve().unwrap();
        assert_eq!(inv.grammar, GrammarKind::Lua);
        assert_eq!(inv.input, "math");
    }

    #[test]
    fn render_flag() {
        assert!(cli(&["-r", "f.lua"]).render);
        assert!(cli(&["--render", "f.lua"]).render);
    }
}
