//! CLI binary for NMEA Monitor
//!
//! Reads NMEA-0183 records from a file, a serial device node or stdin, shows the
//! live receiver snapshot and writes the session history when input ends.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use env_logger::{Builder, Target};
use log::{debug, error, info, warn, LevelFilter};
use nmea_monitor::{
    export_session, send_command, ChecksumMode, DecoderOptions, ExportOptions, LineSource,
    NmeaError, ReceiverSnapshot, ReceiverStateMachine, COLD_START_COMMAND, DEFAULT_LOG_FILE,
};
use std::fs::OpenOptions;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

const GIT_SHA: &str = match option_env!("VERGEN_GIT_SHA") {
    Some(sha) => sha,
    None => "unknown",
};

fn init_logging(debug: bool) {
    let mut builder = Builder::from_default_env();
    builder
        .target(Target::Stderr)
        .format_timestamp_secs()
        .format_module_path(false);

    if debug {
        builder.filter_level(LevelFilter::Debug);
    } else if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(LevelFilter::Info);
    }
    builder.init();
}

fn open_input(input: &str, cold_start: bool) -> Result<Box<dyn BufRead>> {
    if input == "-" {
        if cold_start {
            warn!("--cold-start ignored: stdin is not writable");
        }
        return Ok(Box::new(io::stdin().lock()));
    }

    let mut file = OpenOptions::new()
        .read(true)
        .write(cold_start)
        .open(input)
        .with_context(|| format!("Failed to open input: {input}"))?;

    if cold_start {
        send_command(&mut file, &COLD_START_COMMAND)
            .with_context(|| format!("Failed to send cold-start command to {input}"))?;
        info!("Sent cold-start command to {input}");
    }

    Ok(Box::new(BufReader::new(file)))
}

fn draw_panel<W: Write>(out: &mut W, snapshot: &ReceiverSnapshot, clear: bool) -> io::Result<()> {
    if clear {
        // clear screen and home the cursor
        write!(out, "\x1B[2J\x1B[H")?;
    }
    writeln!(out, "{}", snapshot)?;
    out.flush()
}

/// Append one history row and redraw the snapshot panel on `out`
///
/// Returns false once the panel reader has gone away.
fn refresh<W: Write>(machine: &mut ReceiverStateMachine, out: Option<&mut W>, clear: bool) -> bool {
    machine.log_snapshot();
    let Some(out) = out else {
        return true;
    };
    match draw_panel(out, machine.snapshot(), clear) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            info!("Output closed, ending session");
            false
        }
        Err(e) => {
            debug!("Failed to draw snapshot panel: {e}");
            true
        }
    }
}

/// Print a line on stdout, logging instead of panicking when stdout is gone
fn emit(line: &str) {
    if let Err(e) = writeln!(io::stdout(), "{line}") {
        debug!("Failed to write to stdout: {e}");
    }
}

fn main() -> Result<()> {
    let matches = Command::new("NMEA Monitor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Decode NMEA-0183 GNSS sentences into a live receiver snapshot and log it to CSV.")
        .arg(
            Arg::new("input")
                .help("NMEA source: a capture file, a serial device node, or '-' for stdin")
                .default_value("-")
                .index(1),
        )
        .arg(
            Arg::new("log-file")
                .short('l')
                .long("log-file")
                .help("History log file written when the session ends")
                .value_name("FILE")
                .default_value(DEFAULT_LOG_FILE),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Also write the history as JSON next to the log file (requires the json feature)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-csv")
                .long("no-csv")
                .help("Do not write the CSV history log")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("checksum")
                .long("checksum")
                .help("Checksum validation: ignore, optional (verify when present) or required")
                .value_parser(["ignore", "optional", "required"])
                .default_value("ignore"),
        )
        .arg(
            Arg::new("interval-ms")
                .long("interval-ms")
                .help("Screen refresh and history interval in milliseconds (0: after every recognized sentence)")
                .value_name("MS")
                .value_parser(clap::value_parser!(u64))
                .default_value("1000"),
        )
        .arg(
            Arg::new("max-sentences")
                .long("max-sentences")
                .help("Stop after processing this many sentences")
                .value_name("N")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Do not print the snapshot panel")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("cold-start")
                .long("cold-start")
                .help("Send the receiver cold-start command before reading")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug output and per-sentence decoding details")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let debug = matches.get_flag("debug");
    init_logging(debug);
    debug!("nmea_monitor {} ({GIT_SHA})", env!("CARGO_PKG_VERSION"));

    let input = matches
        .get_one::<String>("input")
        .map(String::as_str)
        .unwrap_or("-");
    let checksum = match matches.get_one::<String>("checksum").map(String::as_str) {
        Some("optional") => ChecksumMode::Optional,
        Some("required") => ChecksumMode::Required,
        _ => ChecksumMode::Ignore,
    };
    let interval = Duration::from_millis(
        matches
            .get_one::<u64>("interval-ms")
            .copied()
            .unwrap_or(1000),
    );
    let max_sentences = matches.get_one::<u64>("max-sentences").copied();
    let mut panel = !matches.get_flag("quiet");
    let mut stdout = io::stdout();
    let clear = stdout.is_terminal();

    let export_options = ExportOptions {
        csv: !matches.get_flag("no-csv"),
        json: matches.get_flag("json"),
        log_file: matches
            .get_one::<String>("log-file")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
    };

    let reader = open_input(input, matches.get_flag("cold-start"))?;
    let mut source = LineSource::new(reader);
    let mut machine = ReceiverStateMachine::new(DecoderOptions { checksum });

    let mut processed: u64 = 0;
    let mut last_update = Instant::now();
    let mut source_failure = None;

    loop {
        if max_sentences.is_some_and(|max| processed >= max) {
            info!("Reached --max-sentences limit ({processed})");
            break;
        }

        match machine.process_next_sentence(&mut source) {
            Ok(outcome) => {
                processed += 1;
                if interval.is_zero()
                    && outcome.is_recognized()
                    && !refresh(&mut machine, panel.then_some(&mut stdout), clear)
                {
                    panel = false;
                    break;
                }
            }
            Err(NmeaError::Timeout) => {
                debug!("Read timed out, polling again");
            }
            Err(NmeaError::EndOfStream) => {
                info!("End of input after {} records", source.records_read);
                break;
            }
            Err(e) => {
                error!("Source failure: {e}");
                source_failure = Some(e);
                break;
            }
        }

        if !interval.is_zero() && last_update.elapsed() >= interval {
            if !refresh(&mut machine, panel.then_some(&mut stdout), clear) {
                panel = false;
                break;
            }
            last_update = Instant::now();
        }
    }

    // final state, so short replays still leave one history row
    if !interval.is_zero() {
        refresh(&mut machine, panel.then_some(&mut stdout), clear);
    }

    let stats = &machine.stats;
    emit(&format!(
        "Processed {} sentences: {} recognized, {} unrecognized, {} decode failures",
        stats.total(),
        stats.recognized,
        stats.unrecognized,
        stats.decode_failures
    ));

    let report = export_session(machine.snapshot(), &export_options)
        .context("Failed to export session history")?;
    if let Some(path) = &report.csv_path {
        emit(&format!(
            "Exported {} history rows to: {}",
            report.rows,
            path.display()
        ));
    }
    if let Some(path) = &report.json_path {
        emit(&format!("Exported history JSON to: {}", path.display()));
    }

    if let Some(e) = source_failure {
        return Err(e).context("Session ended by a source failure");
    }

    Ok(())
}
