use hexbridge::operation::BridgeEvent;
use hexbridge::storage::Medium;
use hexbridge::Dispatcher;

use crate::cli;
use crate::context;
use crate::exit_codes;
use crate::output::{Event, Reporter};

pub fn run(args: cli::SendArgs, out: &mut dyn Reporter) -> i32 {
    let config = context::bridge_config(&args.image, Some(&args.link));
    let transport = context::serial_transport(&args.link, &config);
    let medium = Medium::new(&args.image.medium);

    let mut bridge = Dispatcher::new(transport, config);
    out.emit(Event::Bridge(BridgeEvent::Status(bridge.status())));
    let _ = bridge.load_image(&medium, |ev| out.emit(Event::Bridge(ev)));

    let r = bridge.dispatch(args.code, |ev| out.emit(Event::Bridge(ev)));
    match r {
        Ok(_) => exit_codes::EXIT_OK,
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
