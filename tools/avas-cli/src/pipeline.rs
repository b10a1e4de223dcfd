//! Conversion pipeline: WAV folder in, sound image artifacts out.
//!
//! The run has two phases. Phase 1 converts every file to a FLAC blob and
//! allocates its record address; the result is a [`PendingImage`]. For engine
//! sounds the caller reviews the position slots between phases; event sounds
//! go straight to phase 2, which merges the records and writes the artifacts.
//!
//! The first failing file aborts the whole run; partial images are never
//! written.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use avas_audio::{convert_wav, SoundEncoder};
use avas_image::{
    allocate_addresses, default_positions, resolve_positions, write_bin_file, write_c_header_file,
    write_hex_file, ImageMerger, SoundRecord, SoundType, ENGINE_BIN_FILE, ENGINE_HEADER_FILE,
    ENGINE_HEX_FILE, EVENT_HEX_FILE, OUTPUT_FOLDER, SOUND_POSITION_COUNT,
};

use crate::runlog::RunLog;

/// Width of the separator banners in progress output.
const LOG_WIDTH: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no WAV files found in {}", .0.display())]
    NoInputFiles(PathBuf),
}

/// Everything a run needs to know up front.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub input_folder: PathBuf,
    pub sound_type: SoundType,
    pub start_address: u32,
    pub image_size_kb: f64,
    pub output_base: PathBuf,
    /// Also write the engine image as Intel-HEX text.
    pub emit_engine_hex: bool,
}

/// One converted input: name, allocated record address, total record size.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub address: u32,
    pub size: u32,
}

/// Phase 1 output: converted records with their allocated addresses, waiting
/// for the merge.
#[derive(Debug)]
pub struct PendingImage {
    pub records: Vec<SoundRecord>,
    pub entries: Vec<FileEntry>,
}

impl PendingImage {
    pub fn address_table(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.address).collect()
    }
}

/// WAV files in the folder, sorted by name for a deterministic record order.
pub fn find_wav_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(folder)
        .with_context(|| format!("failed to read input folder {}", folder.display()))?
    {
        let path = entry?.path();
        let is_wav = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
        if path.is_file() && is_wav {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn note(log: &mut RunLog, progress: &dyn Fn(&str), msg: &str) {
    log.add(msg);
    progress(msg);
}

/// Phase 1: convert every WAV file and allocate record addresses.
pub fn convert_all<E: SoundEncoder>(
    opts: &ConvertOptions,
    encoder: &E,
    log: &mut RunLog,
    progress: &dyn Fn(&str),
) -> Result<PendingImage> {
    let files = find_wav_files(&opts.input_folder)?;
    if files.is_empty() {
        return Err(PipelineError::NoInputFiles(opts.input_folder.clone()).into());
    }

    note(log, progress, &"=".repeat(LOG_WIDTH));
    note(
        log,
        progress,
        &format!("[ File Conversion : {} ]", opts.sound_type),
    );

    let mut names = Vec::with_capacity(files.len());
    let mut records = Vec::with_capacity(files.len());
    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let payload =
            convert_wav(path, encoder).with_context(|| format!("Conversion Failed : {name}"))?;
        let record = SoundRecord::build(payload, opts.sound_type, &name)?;
        note(log, progress, &format!("Converted successfully : {name}"));
        names.push(name);
        records.push(record);
    }
    note(log, progress, &format!("{} file(s) converted", records.len()));

    let sizes: Vec<u32> = records.iter().map(SoundRecord::total_size).collect();
    let addresses = allocate_addresses(opts.sound_type, opts.start_address, &sizes);

    let entries = names
        .into_iter()
        .zip(&addresses)
        .zip(&sizes)
        .map(|((name, &address), &size)| FileEntry {
            name,
            address,
            size,
        })
        .collect();

    Ok(PendingImage { records, entries })
}

/// One line per converted file: name, record address, record size.
pub fn file_info_lines(pending: &PendingImage) -> Vec<String> {
    pending
        .entries
        .iter()
        .map(|e| format!("{:<50} | 0x{:08X} | 0x{:08X}", e.name, e.address, e.size))
        .collect()
}

/// Phase 2: validate positions (engine only), merge and write the artifacts.
///
/// `positions` is ignored for event sounds. `None` for an engine sound leaves
/// every slot unassigned.
pub fn finalize(
    pending: &PendingImage,
    positions: Option<&[String]>,
    opts: &ConvertOptions,
    log: &mut RunLog,
    progress: &dyn Fn(&str),
) -> Result<Vec<PathBuf>> {
    let resolved = match opts.sound_type {
        SoundType::Engine => {
            let defaults = default_positions();
            let values = positions.unwrap_or(&defaults);
            Some(resolve_positions(values, &pending.address_table())?)
        }
        SoundType::Event => None,
    };

    note(log, progress, &"=".repeat(LOG_WIDTH));
    note(
        log,
        progress,
        &format!("[ File Merge : {} ]", opts.sound_type),
    );

    let merger = ImageMerger::new(opts.sound_type, opts.start_address, Some(opts.image_size_kb));
    let image = merger.merge(&pending.records, resolved.as_ref())?;
    note(
        log,
        progress,
        &format!(
            "Image range 0x{:08X}..0x{:08X} | {} bytes",
            image.min_addr(),
            image.max_addr(),
            image.len()
        ),
    );

    let out_dir = opts
        .output_base
        .join(OUTPUT_FOLDER)
        .join(opts.sound_type.folder_name());
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create output folder {}", out_dir.display()))?;

    let mut written = Vec::new();
    match opts.sound_type {
        SoundType::Engine => {
            let bin_path = out_dir.join(ENGINE_BIN_FILE);
            write_bin_file(&image, &bin_path)?;
            written.push(bin_path);

            let header_path = out_dir.join(ENGINE_HEADER_FILE);
            write_c_header_file(&image, &header_path)?;
            written.push(header_path);

            if opts.emit_engine_hex {
                let hex_path = out_dir.join(ENGINE_HEX_FILE);
                write_hex_file(&image, &hex_path)?;
                written.push(hex_path);
            }
        }
        SoundType::Event => {
            let hex_path = out_dir.join(EVENT_HEX_FILE);
            write_hex_file(&image, &hex_path)?;
            written.push(hex_path);
        }
    }
    for path in &written {
        note(log, progress, &format!("Merged output : {}", path.display()));
    }
    note(log, progress, &"=".repeat(LOG_WIDTH));

    Ok(written)
}
