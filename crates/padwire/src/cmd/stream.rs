use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;

use padwire_frame::encode_frame;
use padwire_session::{SendOutcome, SessionConfig, WebRtcSession};
use padwire_transport::IceServer;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::{Interval, MissedTickBehavior};

use crate::cmd::{encode::parse_state, parse_duration, StreamArgs};
use crate::exit::{
    io_error, session_error, CliError, CliResult, SUCCESS, TIMEOUT, TRANSPORT_ERROR, USAGE,
};
use crate::output::{print_summary, OutputFormat, StreamSummary};

#[derive(Debug, Default)]
struct Counters {
    lines_read: u64,
    lines_invalid: u64,
    remote_closed: bool,
}

pub fn run(args: StreamArgs, format: OutputFormat) -> CliResult<i32> {
    let connect_timeout = parse_duration(&args.connect_timeout)?;
    let signaling_timeout = args
        .signaling_timeout
        .as_deref()
        .map(parse_duration)
        .transpose()?;
    let period = args.rate.map(rate_period).transpose()?;

    let config = SessionConfig {
        signaling_url: args.signaling_url.clone(),
        signaling_timeout,
        ice_servers: build_ice_servers(&args)?,
        ..SessionConfig::default()
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| io_error("failed to start runtime", err))?;

    runtime.block_on(stream(args, config, connect_timeout, period, format))
}

async fn stream(
    args: StreamArgs,
    config: SessionConfig,
    connect_timeout: Duration,
    period: Option<Duration>,
    format: OutputFormat,
) -> CliResult<i32> {
    let mut session = WebRtcSession::from_config(&config)
        .map_err(|err| session_error("failed to create session", err))?;

    tracing::info!(url = %config.signaling_url, "negotiating");
    match tokio::time::timeout(connect_timeout, session.negotiate()).await {
        Ok(Ok(())) => tracing::info!("channel open"),
        Ok(Err(err)) => return Err(session_error("negotiation failed", err)),
        Err(_) => {
            if let Err(err) = session.close().await {
                tracing::warn!(error = %err, "close after timeout failed");
            }
            return Err(CliError::new(
                TIMEOUT,
                format!("channel not open within {connect_timeout:?}"),
            ));
        }
    }

    let pumped = pump(&mut session, &args, period).await;

    if let Err(err) = session.close().await {
        tracing::warn!(error = %err, "close failed");
    }
    let counters = pumped?;

    let stats = session.stats();
    let summary = StreamSummary {
        state: session.state().to_string(),
        lines_read: counters.lines_read,
        lines_invalid: counters.lines_invalid,
        frames_sent: stats.frames_sent,
        frames_dropped: stats.frames_dropped,
        close_reason: session.close_reason().map(str::to_string),
    };
    print_summary(&summary, format);

    if counters.remote_closed {
        Ok(TRANSPORT_ERROR)
    } else {
        Ok(SUCCESS)
    }
}

/// Read states line by line and send one frame per state until input ends,
/// the user interrupts, or the session closes.
async fn pump(
    session: &mut WebRtcSession,
    args: &StreamArgs,
    period: Option<Duration>,
) -> CliResult<Counters> {
    let mut lines = open_input(&args.input).await?.lines();
    let mut ticker = period.map(pacing_interval);
    let mut counters = Counters::default();

    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.map_err(|err| io_error("failed reading input", err))?,
            _ = &mut interrupted => {
                tracing::info!("interrupted");
                break;
            }
        };
        let Some(line) = line else {
            tracing::debug!("input exhausted");
            break;
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        counters.lines_read += 1;

        let state = match parse_state(line, "input line") {
            Ok(state) => state,
            Err(err) => {
                counters.lines_invalid += 1;
                tracing::warn!(line = counters.lines_read, error = %err, "skipping line");
                continue;
            }
        };

        if !pace(&mut ticker, interrupted.as_mut()).await {
            tracing::info!("interrupted");
            break;
        }

        let frame = encode_frame(args.slot, &state);
        if session.send_frame(&frame) == SendOutcome::Dropped && session.state().is_closed() {
            tracing::warn!(
                reason = session.close_reason().unwrap_or("unknown"),
                "session closed"
            );
            counters.remote_closed = true;
            break;
        }
    }

    Ok(counters)
}

async fn open_input(path: &Path) -> CliResult<Box<dyn AsyncBufRead + Unpin + Send>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }
    let file = File::open(path)
        .await
        .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Wait for the next pacing tick. Returns `false` if `interrupted`
/// completes first.
async fn pace<F: Future>(ticker: &mut Option<Interval>, interrupted: Pin<&mut F>) -> bool {
    let Some(ticker) = ticker.as_mut() else {
        return true;
    };
    tokio::select! {
        _ = ticker.tick() => true,
        _ = interrupted => false,
    }
}

fn pacing_interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

fn rate_period(rate: u32) -> CliResult<Duration> {
    if rate == 0 {
        return Err(CliError::new(USAGE, "--rate must be greater than zero"));
    }
    let period = Duration::from_secs(1) / rate;
    if period.is_zero() {
        return Err(CliError::new(
            USAGE,
            format!("--rate {rate} is above one frame per nanosecond"),
        ));
    }
    Ok(period)
}

fn build_ice_servers(args: &StreamArgs) -> CliResult<Vec<IceServer>> {
    let mut servers = if args.stun.is_empty() {
        IceServer::defaults()
    } else {
        args.stun.iter().cloned().map(IceServer::stun).collect()
    };

    match (&args.turn, &args.turn_username, &args.turn_credential) {
        (Some(url), Some(username), Some(credential)) => {
            servers.push(IceServer::turn(url, username, credential));
        }
        (Some(_), _, _) => {
            return Err(CliError::new(
                USAGE,
                "--turn requires --turn-username and --turn-credential",
            ));
        }
        (None, Some(_), _) => {
            return Err(CliError::new(USAGE, "--turn-username requires --turn"));
        }
        // A credential alone may come from the environment; ignore it.
        (None, None, _) => {}
    }

    Ok(servers)
}
