mod cli;
mod commands;

use clap::Parser;

use cli::{Cli, Command};

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Parse { input, rule, full, output } => commands::run_parse(input, rule, full, output.color),
        Command::Check { input, rule, full, output } => commands::run_check(input, rule, full, output.color),
        Command::Rules => commands::run_rules(),
    }
}
