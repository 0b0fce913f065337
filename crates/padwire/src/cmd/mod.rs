use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use padwire_session::DEFAULT_SIGNALING_URL;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod stream;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode one controller state into a 13-byte frame.
    Encode(EncodeArgs),
    /// Decode a 13-byte frame back into controller state.
    Decode(DecodeArgs),
    /// Negotiate a session and stream JSON-lines states as frames.
    Stream(StreamArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Stream(args) => stream::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Player slot. Only the low 8 bits are encoded.
    #[arg(long, short = 's', default_value = "0")]
    pub slot: usize,
    /// Controller state as JSON. Omitted fields default to neutral.
    #[arg(long, conflicts_with = "file")]
    pub json: Option<String>,
    /// Read controller state JSON from a file.
    #[arg(long, conflicts_with = "json")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame bytes as hex. Whitespace, `:` and `-` separators are ignored.
    pub hex: String,
}

#[derive(Args, Debug)]
pub struct StreamArgs {
    /// JSON-lines file of controller states, or `-` for stdin.
    #[arg(long, short = 'i', default_value = "-")]
    pub input: PathBuf,
    /// Player slot stamped on every frame.
    #[arg(long, short = 's', default_value = "0")]
    pub slot: usize,
    /// Pace sends to this many frames per second. Default: as fast as input arrives.
    #[arg(long)]
    pub rate: Option<u32>,
    /// Signaling endpoint the offer is POSTed to.
    #[arg(long, env = "PADWIRE_SIGNALING_URL", default_value = DEFAULT_SIGNALING_URL)]
    pub signaling_url: String,
    /// Per-request signaling timeout (e.g. 5s, 500ms).
    #[arg(long)]
    pub signaling_timeout: Option<String>,
    /// STUN server URL. Repeatable. Default: a public STUN server.
    #[arg(long, value_name = "URL")]
    pub stun: Vec<String>,
    /// TURN server URL. Requires --turn-username and --turn-credential.
    #[arg(long, value_name = "URL")]
    pub turn: Option<String>,
    /// TURN username.
    #[arg(long)]
    pub turn_username: Option<String>,
    /// TURN credential.
    #[arg(long, env = "PADWIRE_TURN_CREDENTIAL", hide_env_values = true)]
    pub turn_credential: Option<String>,
    /// Give up if the channel is not open within this long (e.g. 10s, 500ms).
    #[arg(long, default_value = "10s")]
    pub connect_timeout: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `150ms`, `5s` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(match unit {
        "ms" => Duration::from_millis(value),
        _ => Duration::from_secs(value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds() {
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration(" 2 ").unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn parse_duration_millis() {
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
    }

    #[test]
    fn parse_duration_invalid() {
        for input in ["", "0s", "0ms", "fast", "-1s", "1.5s"] {
            let err = parse_duration(input).unwrap_err();
            assert_eq!(err.code, USAGE, "{input:?}");
        }
    }
}
