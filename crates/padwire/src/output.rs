use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use padwire_frame::{ControllerState, Frame};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    slot: u8,
    len: usize,
    hex: String,
    bytes: &'a [u8],
}

pub fn print_frame(frame: &Frame, format: OutputFormat) {
    let hex = to_hex(frame.as_ref());
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                slot: frame.slot(),
                len: frame.as_ref().len(),
                hex,
                bytes: frame.as_ref(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SLOT", "LEN", "FRAME"])
                .add_row(vec![
                    frame.slot().to_string(),
                    frame.as_ref().len().to_string(),
                    hex,
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("slot={} frame={}", frame.slot(), hex);
        }
        OutputFormat::Raw => {
            print_raw(frame.as_ref());
        }
    }
}

#[derive(Serialize)]
struct StateOutput<'a> {
    slot: u8,
    state: &'a ControllerState,
}

pub fn print_state(slot: u8, state: &ControllerState, format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Raw => print_json(&StateOutput { slot, state }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"])
                .add_row(vec!["slot".to_string(), slot.to_string()])
                .add_row(vec!["buttons".to_string(), join_names(state.buttons.iter_names())])
                .add_row(vec!["grips".to_string(), join_names(state.grips.iter_names())])
                .add_row(vec![
                    "left_stick".to_string(),
                    stick_summary(&state.left_stick),
                ])
                .add_row(vec![
                    "right_stick".to_string(),
                    stick_summary(&state.right_stick),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "slot={} buttons={} grips={} left=({}) right=({})",
                slot,
                join_names(state.buttons.iter_names()),
                join_names(state.grips.iter_names()),
                stick_summary(&state.left_stick),
                stick_summary(&state.right_stick),
            );
        }
    }
}

#[derive(Serialize)]
pub struct StreamSummary {
    pub state: String,
    pub lines_read: u64,
    pub lines_invalid: u64,
    pub frames_sent: u64,
    pub frames_dropped: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_reason: Option<String>,
}

pub fn print_summary(summary: &StreamSummary, format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Raw => print_json(summary),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["STATE", "READ", "INVALID", "SENT", "DROPPED", "REASON"])
                .add_row(vec![
                    summary.state.clone(),
                    summary.lines_read.to_string(),
                    summary.lines_invalid.to_string(),
                    summary.frames_sent.to_string(),
                    summary.frames_dropped.to_string(),
                    summary.close_reason.clone().unwrap_or_default(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "state={} read={} invalid={} sent={} dropped={}{}",
                summary.state,
                summary.lines_read,
                summary.lines_invalid,
                summary.frames_sent,
                summary.frames_dropped,
                summary
                    .close_reason
                    .as_deref()
                    .map(|reason| format!(" reason={reason}"))
                    .unwrap_or_default()
            );
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

/// Lowercase hex, one space between bytes.
pub fn to_hex(data: &[u8]) -> String {
    data.iter()
        .map(|byte| hex::encode([*byte]))
        .collect::<Vec<_>>()
        .join(" ")
}

fn stick_summary(stick: &padwire_frame::StickState) -> String {
    format!(
        "x={} y={}{}",
        stick.x,
        stick.y,
        if stick.pressed { " pressed" } else { "" }
    )
}

/// Flag names joined with `|`, or `-` when none are set.
fn join_names<T>(names: impl Iterator<Item = (&'static str, T)>) -> String {
    let joined = names.map(|(name, _)| name).collect::<Vec<_>>().join(" | ");
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined
    }
}
