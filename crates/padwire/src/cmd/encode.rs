use std::fs;

use padwire_frame::{encode_frame, ControllerState};

use crate::cmd::EncodeArgs;
use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let state = resolve_state(&args)?;
    let frame = encode_frame(args.slot, &state);
    tracing::debug!(slot = args.slot, ?frame, "encoded frame");
    print_frame(&frame, format);
    Ok(SUCCESS)
}

fn resolve_state(args: &EncodeArgs) -> CliResult<ControllerState> {
    if let Some(json) = &args.json {
        return parse_state(json, "--json");
    }
    if let Some(path) = &args.file {
        let text = fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        return parse_state(&text, &path.display().to_string());
    }
    Ok(ControllerState::neutral())
}

pub(crate) fn parse_state(text: &str, source: &str) -> CliResult<ControllerState> {
    serde_json::from_str(text).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("{source} is not a valid controller state: {err}"),
        )
    })
}
