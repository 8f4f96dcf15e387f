use std::process;

use clap::Parser;

mod cli;
mod commands;
mod context;
mod exit_codes;
mod logging;
mod output;

fn main() {
    logging::init_tracing();

    let cli = cli::Cli::parse();

    let exit_code = match cli.command {
        cli::Command::Session(args) => {
            let mut out = output::make_for_session(&args);
            let code = commands::session::run(args, &mut *out);
            out.finish();
            code
        }
        cli::Command::Send(args) => {
            let mut out = output::make_for_send(&args);
            let code = commands::send::run(args, &mut *out);
            out.finish();
            code
        }
        cli::Command::Inspect(args) => {
            let mut out = output::make_for_inspect(&args);
            let code = commands::inspect::run(args, &mut *out);
            out.finish();
            code
        }
        cli::Command::List(args) => {
            let mut out = output::make_for_list(&args);
            let code = commands::list::run(args, &mut *out);
            out.finish();
            code
        }
    };

    process::exit(exit_code);
}
