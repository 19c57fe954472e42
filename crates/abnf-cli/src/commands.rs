//! Command implementations. Each one drives `abnf-core` directly against the
//! always-present core rule map; there is no bootstrap loader here to parse
//! a user's own `.abnf` grammar file, only the RFC 5234 core rules and
//! whatever rules they derive (`crlf`, `hexdig`, `wsp`, `lwsp`).

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use abnf_core::{core_rules, cursor_from, kickoff, print_tree};
use log::debug;

use crate::cli::{ColorChoice, InputArgs};

fn load_input(args: &InputArgs) -> String {
    if let Some(text) = &args.input_text {
        if text == "-" {
            return read_stdin();
        }
        return text.clone();
    }
    if let Some(path) = &args.input_file {
        return read_file(path);
    }
    unreachable!("clap enforces input_source group")
}

fn read_stdin() -> String {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf).unwrap_or_else(|err| {
        eprintln!("error: failed to read stdin: {err}");
        std::process::exit(1);
    });
    buf
}

fn read_file(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| {
        eprintln!("error: failed to read {}: {err}", path.display());
        std::process::exit(1);
    })
}

pub fn run_parse(input: InputArgs, rule: String, full: bool, color: ColorChoice) {
    let source = load_input(&input);
    let rules = core_rules();
    debug!("parsing {} code points against rule '{rule}'", source.chars().count());

    match kickoff(cursor_from(&source), &rules, &rule) {
        Ok((atom, cursor)) => {
            if full && !cursor.at_eof() {
                eprintln!(
                    "error: rule '{rule}' matched but left input unconsumed at position {}",
                    cursor.error_position()
                );
                std::process::exit(1);
            }
            print!("{}", print_tree(&atom));
        }
        Err(failure) => {
            eprintln!("{}", render_failure(&failure, &source, color));
            std::process::exit(1);
        }
    }
}

pub fn run_check(input: InputArgs, rule: String, full: bool, color: ColorChoice) {
    let source = load_input(&input);
    let rules = core_rules();

    match kickoff(cursor_from(&source), &rules, &rule) {
        Ok((_, cursor)) if full && !cursor.at_eof() => {
            eprintln!(
                "error: rule '{rule}' matched but left input unconsumed at position {}",
                cursor.error_position()
            );
            std::process::exit(1);
        }
        Ok(_) => {
            // Silent on success, like `cargo check`.
        }
        Err(failure) => {
            eprintln!("{}", render_failure(&failure, &source, color));
            std::process::exit(1);
        }
    }
}

pub fn run_rules() {
    let rules = core_rules();
    let mut names: Vec<&str> = rules.names().collect();
    names.sort_unstable();
    for name in names {
        println!("{name}");
    }
}

fn render_failure(failure: &abnf_core::consumer::Failure, source: &str, color: ColorChoice) -> String {
    match failure {
        abnf_core::consumer::Failure::Parse(err) => err.printer().source(source).colored(color.should_colorize()).render(),
        abnf_core::consumer::Failure::Fatal(err) => err.to_string(),
    }
}
