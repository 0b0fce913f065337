use padwire_frame::decode_frame;

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_state, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = parse_hex(&args.hex)?;
    let (slot, state) = decode_frame(&bytes).map_err(|err| frame_error("decode failed", err))?;
    print_state(slot, &state, format);
    Ok(SUCCESS)
}

/// Parse hex digit pairs, skipping whitespace and `:`/`-` separators.
fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: String = input
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && *c != ':' && *c != '-')
        .collect();
    hex::decode(&digits)
        .map_err(|err| CliError::new(DATA_INVALID, format!("invalid hex input: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_separated_hex() {
        assert_eq!(parse_hex("03 11 00").unwrap(), vec![0x03, 0x11, 0x00]);
        assert_eq!(parse_hex("9C:ff-0a").unwrap(), vec![0x9c, 0xff, 0x0a]);
        assert_eq!(parse_hex("0311").unwrap(), vec![0x03, 0x11]);
        assert!(parse_hex("").unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_hex() {
        assert_eq!(parse_hex("031").unwrap_err().code, DATA_INVALID);
        assert_eq!(parse_hex("zz").unwrap_err().code, DATA_INVALID);
    }
}
