//! `avas convert` - turn a folder of WAV files into a sound image.
//!
//! Phase 1 (conversion + address allocation) runs on a worker thread and
//! streams its progress lines back over a channel. Engine runs then pause so
//! the operator can review the 10 position slots; event runs go straight to
//! the merge.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;

use avas_audio::{FlacEncoder, DEFAULT_BLOCK_SIZE, DEFAULT_COMPRESSION_LEVEL};
use avas_image::{
    default_positions, format_address, parse_address, resolve_positions, ImageError, SoundType,
    DEFAULT_ENGINE_START_ADDRESS, DEFAULT_EVENT_START_ADDRESS, DEFAULT_IMAGE_SIZE_KB,
    POSITION_LABELS, SOUND_POSITION_COUNT, UNASSIGNED_POSITION,
};

use crate::pipeline::{self, ConvertOptions, PendingImage};
use crate::runlog::RunLog;
use crate::settings::Settings;

#[derive(Args)]
pub struct ConvertArgs {
    /// Folder containing the source WAV files
    #[arg(short, long)]
    input: PathBuf,

    /// Image layout to build
    #[arg(short = 't', long, value_enum)]
    sound_type: SoundTypeArg,

    /// Flash start address, 8 hex digits (event sounds only)
    #[arg(long)]
    start_address: Option<String>,

    /// Fixed engine image size in KB
    #[arg(long, default_value_t = DEFAULT_IMAGE_SIZE_KB)]
    size_kb: f64,

    /// FLAC compression level
    #[arg(long, default_value_t = DEFAULT_COMPRESSION_LEVEL, value_parser = clap::value_parser!(u8).range(0..=10))]
    compression_level: u8,

    /// FLAC block size in samples
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: u32,

    /// Path to the flac executable (default: first match on PATH)
    #[arg(long)]
    flac: Option<PathBuf>,

    /// File with 10 position addresses, one per line (engine sounds)
    #[arg(long, conflicts_with = "accept_defaults")]
    positions: Option<PathBuf>,

    /// Skip the position review and leave every slot unassigned
    #[arg(long)]
    accept_defaults: bool,

    /// Also write the engine image as Intel-HEX text
    #[arg(long)]
    emit_hex: bool,

    /// Output base folder (default: from settings)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum SoundTypeArg {
    Engine,
    Event,
}

impl From<SoundTypeArg> for SoundType {
    fn from(arg: SoundTypeArg) -> Self {
        match arg {
            SoundTypeArg::Engine => SoundType::Engine,
            SoundTypeArg::Event => SoundType::Event,
        }
    }
}

pub fn execute(args: ConvertArgs) -> Result<()> {
    let sound_type = SoundType::from(args.sound_type);

    // The engine image address is part of the flash layout contract and is
    // not operator-editable.
    let start_address = match (sound_type, &args.start_address) {
        (SoundType::Engine, Some(_)) => {
            bail!("engine sound start address is fixed at 0x{DEFAULT_ENGINE_START_ADDRESS}")
        }
        (SoundType::Engine, None) => parse_address(DEFAULT_ENGINE_START_ADDRESS)?,
        (SoundType::Event, Some(addr)) => parse_address(&addr.trim().to_uppercase())?,
        (SoundType::Event, None) => parse_address(DEFAULT_EVENT_START_ADDRESS)?,
    };

    let encoder = match &args.flac {
        Some(program) => {
            FlacEncoder::with_program(program.clone(), args.compression_level, args.block_size)
        }
        None => FlacEncoder::locate(args.compression_level, args.block_size)?,
    };

    let output_base = match &args.output {
        Some(path) => path.clone(),
        None => Settings::load().output_base(),
    };

    let opts = ConvertOptions {
        input_folder: args.input.clone(),
        sound_type,
        start_address,
        image_size_kb: args.size_kb,
        output_base,
        emit_engine_hex: args.emit_hex,
    };

    // Phase 1 on a worker thread; progress lines stream back over a channel.
    let (tx, rx) = mpsc::channel::<String>();
    let worker = {
        let opts = opts.clone();
        let encoder = encoder.clone();
        thread::spawn(move || {
            let mut log = RunLog::new();
            let pending = pipeline::convert_all(&opts, &encoder, &mut log, &|msg| {
                let _ = tx.send(msg.to_string());
            });
            (pending, log)
        })
    };
    for line in rx {
        println!("{line}");
    }
    let (pending, mut log) = worker
        .join()
        .map_err(|_| anyhow!("conversion worker panicked"))?;
    let pending = match pending {
        Ok(pending) => pending,
        Err(err) => {
            // Failed runs still leave a log behind.
            log.add(format!("Conversion aborted : {err:#}"));
            if let Err(save_err) = log.save(&opts.output_base) {
                eprintln!("warning: failed to save run log: {save_err:#}");
            }
            return Err(err);
        }
    };

    for line in pipeline::file_info_lines(&pending) {
        println!("{line}");
        log.add(line);
    }

    let positions = match sound_type {
        SoundType::Engine => Some(gather_positions(&args, &pending)?),
        SoundType::Event => None,
    };

    if let Err(err) = pipeline::finalize(&pending, positions.as_deref(), &opts, &mut log, &|msg| {
        println!("{msg}")
    }) {
        log.add(format!("Merge aborted : {err:#}"));
        if let Err(save_err) = log.save(&opts.output_base) {
            eprintln!("warning: failed to save run log: {save_err:#}");
        }
        return Err(err);
    }

    match log.save(&opts.output_base) {
        Ok(path) => println!("Run log saved to {}", path.display()),
        Err(err) => eprintln!("warning: failed to save run log: {err:#}"),
    }
    println!("Processing completed successfully");
    Ok(())
}

/// Engine position slots: from a file, the defaults, or an interactive prompt.
fn gather_positions(args: &ConvertArgs, pending: &PendingImage) -> Result<Vec<String>> {
    if let Some(path) = &args.positions {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read positions file {}", path.display()))?;
        return Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect());
    }
    if args.accept_defaults {
        return Ok(default_positions());
    }

    let table = pending.address_table();
    let stdin = io::stdin();
    loop {
        let values = prompt_positions(&mut stdin.lock())?;
        match resolve_positions(&values, &table) {
            Ok(_) => return Ok(values),
            Err(err @ ImageError::PositionMismatch { .. }) => {
                eprintln!("{err}; enter the addresses again");
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Read one address per slot, empty input leaving the slot unassigned.
fn prompt_positions(input: &mut impl BufRead) -> Result<Vec<String>> {
    let sentinel = format_address(UNASSIGNED_POSITION);
    println!("Assign record addresses to the {SOUND_POSITION_COUNT} sound positions.");
    println!("Press Enter to leave a slot unassigned ({sentinel}).");

    let mut values = Vec::with_capacity(SOUND_POSITION_COUNT);
    for label in POSITION_LABELS {
        print!("  {label} [{sentinel}]: ");
        io::stdout().flush()?;
        let mut line = String::new();
        input.read_line(&mut line)?;
        let line = line.trim();
        values.push(if line.is_empty() {
            sentinel.clone()
        } else {
            line.to_uppercase()
        });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_empty_lines_give_defaults() {
        let mut input = Cursor::new("\n".repeat(SOUND_POSITION_COUNT));
        let values = prompt_positions(&mut input).unwrap();
        assert_eq!(values, default_positions());
    }

    #[test]
    fn test_prompt_uppercases_and_trims() {
        let mut text = String::from(" 1011802c \n");
        text.push_str(&"\n".repeat(SOUND_POSITION_COUNT - 1));
        let mut input = Cursor::new(text);
        let values = prompt_positions(&mut input).unwrap();
        assert_eq!(values[0], "1011802C");
        assert_eq!(values[1], "FFFFFFFF");
    }

    #[test]
    fn test_prompt_eof_counts_as_unassigned() {
        let mut input = Cursor::new("");
        let values = prompt_positions(&mut input).unwrap();
        assert_eq!(values, default_positions());
    }

    #[test]
    fn test_sound_type_mapping() {
        assert_eq!(SoundType::from(SoundTypeArg::Engine), SoundType::Engine);
        assert_eq!(SoundType::from(SoundTypeArg::Event), SoundType::Event);
    }
}
