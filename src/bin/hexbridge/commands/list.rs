use hexbridge::ports;

use crate::cli;
use crate::exit_codes;
use crate::output::{Event, Reporter};

pub fn run(_args: cli::ListArgs, out: &mut dyn Reporter) -> i32 {
    match ports::list_ports() {
        Ok(ps) => {
            out.emit(Event::ListPorts(ps));
            exit_codes::EXIT_OK
        }
        Err(e) => {
            out.emit(Event::Error {
                code: exit_codes::EXIT_UNEXPECTED,
                message: format!("serial port discovery failed: {e}"),
            });
            exit_codes::EXIT_UNEXPECTED
        }
    }
}
