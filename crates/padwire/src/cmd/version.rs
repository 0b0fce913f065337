use padwire_frame::FRAME_LEN;
use padwire_transport::{MAX_RETRANSMITS, ORDERED};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("padwire {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: padwire");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target: {}", option_env!("PADWIRE_BUILD_TARGET").unwrap_or("unknown"));
    println!("profile: {}", option_env!("PADWIRE_BUILD_PROFILE").unwrap_or("unknown"));
    println!("frame_len: {FRAME_LEN}");
    println!("channel: ordered={ORDERED}, max_retransmits={MAX_RETRANSMITS}");
    println!(
        "features: session={}, cli=true",
        cfg!(feature = "session")
    );

    Ok(SUCCESS)
}
