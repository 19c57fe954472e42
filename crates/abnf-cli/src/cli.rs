//! Argument parsing for the `abnf` command-line driver.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn should_colorize(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        }
    }
}

#[derive(Parser)]
#[command(name = "abnf", bin_name = "abnf")]
#[command(about = "Parser-combinator engine driven by ABNF (RFC 5234) grammars")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse input against a rule and print the resulting parse tree
    #[command(after_help = r#"EXAMPLES:
  abnf parse --rule alpha --input A
  abnf parse --rule crlf --input-file request.txt
  echo -n '1*3DIGIT' | abnf parse --rule digit --input -"#)]
    Parse {
        #[command(flatten)]
        input: InputArgs,

        /// Rule to parse from (case-insensitive; core rules are always
        /// available: alpha, bit, char, cr, lf, crlf, ctl, digit, dquote,
        /// htab, octet, sp, vchar, hexdig, wsp, lwsp)
        #[arg(long, short = 'r', value_name = "NAME")]
        rule: String,

        /// Require the whole input to be consumed, not just a prefix
        #[arg(long)]
        full: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Validate that input parses against a rule, reporting only failure
    #[command(after_help = r#"EXAMPLES:
  abnf check --rule crlf --input $'\r\n'
  abnf check --rule digit --input a --full"#)]
    Check {
        #[command(flatten)]
        input: InputArgs,

        /// Rule to parse from
        #[arg(long, short = 'r', value_name = "NAME")]
        rule: String,

        /// Require the whole input to be consumed, not just a prefix
        #[arg(long)]
        full: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List the core rules always present in every rule map
    Rules,
}

#[derive(Args)]
#[group(id = "input_source", required = true, multiple = false)]
pub struct InputArgs {
    /// Input as inline text (use "-" to read from stdin)
    #[arg(long = "input", value_name = "TEXT")]
    pub input_text: Option<String>,

    /// Input read from a file
    #[arg(long = "input-file", value_name = "FILE")]
    pub input_file: Option<PathBuf>,
}

#[derive(Args)]
pub struct OutputArgs {
    /// Colorize diagnostic output (auto-detected by default)
    #[arg(long, default_value = "auto", value_name = "WHEN")]
    pub color: ColorChoice,
}
