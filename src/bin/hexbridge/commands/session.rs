use std::io::{self, BufRead};

use hexbridge::operation::BridgeEvent;
use hexbridge::storage::Medium;
use hexbridge::Dispatcher;

use crate::cli;
use crate::context;
use crate::exit_codes;
use crate::output::{Event, Reporter};

/// Typed instead of a code to read the hex file again.
const RELOAD: &str = "reload";

pub fn run(args: cli::SessionArgs, out: &mut dyn Reporter) -> i32 {
    let config = context::bridge_config(&args.image, Some(&args.link));
    let transport = context::serial_transport(&args.link, &config);
    let medium = Medium::new(&args.image.medium);

    let mut bridge = Dispatcher::new(transport, config);
    out.emit(Event::Bridge(BridgeEvent::Status(bridge.status())));

    // A failed load only drops the ready signal; the session carries on.
    let _ = bridge.load_image(&medium, |ev| out.emit(Event::Bridge(ev)));

    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        out.emit(Event::Prompt);

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                out.emit(Event::Error {
                    code: exit_codes::EXIT_UNEXPECTED,
                    message: format!("stdin: {e}"),
                });
                return exit_codes::EXIT_UNEXPECTED;
            }
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case(RELOAD) {
            let _ = bridge.load_image(&medium, |ev| out.emit(Event::Bridge(ev)));
            continue;
        }

        let Some(code) = context::parse_code(line) else {
            out.emit(Event::Error {
                code: exit_codes::EXIT_UNKNOWN_COMMAND,
                message: format!("not a command code: {line}"),
            });
            continue;
        };

        let r = bridge.dispatch(code, |ev| out.emit(Event::Bridge(ev)));
        if let Err(e) = r {
            out.emit(Event::Error {
                code: exit_codes::for_kind(e.kind()),
                message: e.to_string(),
            });
        }
    }

    exit_codes::EXIT_OK
}
