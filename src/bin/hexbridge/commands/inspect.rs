use hexbridge::storage::Medium;
use hexbridge::{dispatcher, scheduler};

use crate::cli;
use crate::context;
use crate::exit_codes;
use crate::output::{Event, InspectSummary, Reporter};

pub fn run(args: cli::InspectArgs, out: &mut dyn Reporter) -> i32 {
    let config = context::bridge_config(&args.image, None);
    let medium = Medium::new(&args.image.medium);

    let r = dispatcher::read_image(&medium, &config, &mut |ev| out.emit(Event::Bridge(ev)));
    match r {
        Ok(outcome) => {
            let bytes = outcome.image().len();
            let padded = scheduler::padded_len(bytes, config.pacing.page_size);
            let wait = scheduler::drain_wait(padded, &config.pacing);
            let complete = outcome.is_complete();

            out.emit(Event::Inspect(InspectSummary {
                file: config.hex_file_name.clone(),
                bytes,
                complete,
                capacity: config.capacity,
                padded,
                pages: padded / config.pacing.page_size,
                wait_ms: wait.as_millis() as u64,
            }));

            if complete {
                exit_codes::EXIT_OK
            } else {
                exit_codes::EXIT_INVALID_IMAGE
            }
        }
        Err(e) => {
            let code = exit_codes::for_kind(e.kind());
            out.emit(Event::Error {
                code,
                message: e.to_string(),
            });
            code
        }
    }
}
