//! External FLAC encoder adapter.
//!
//! The encoder is a subprocess, invoked once per input file with
//! `--no-padding -<level> --blocksize=<n>` and `-c` so the compressed stream
//! lands on stdout. Resampled audio goes in on stdin (`-`); already-24 kHz
//! files are passed by path. Nothing touches the disk in between.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::AudioError;

/// Default FLAC compression level (0-10).
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 8;

/// Default FLAC block size in samples.
pub const DEFAULT_BLOCK_SIZE: u32 = 512;

/// Codec service seam: one encoded blob per input, in memory.
pub trait SoundEncoder {
    /// Encode a WAV byte stream fed on stdin.
    fn encode_stream(&self, wav_bytes: &[u8]) -> Result<Vec<u8>, AudioError>;

    /// Encode a WAV file by path.
    fn encode_file(&self, path: &Path) -> Result<Vec<u8>, AudioError>;
}

/// Production encoder wrapping the `flac` executable.
#[derive(Debug, Clone)]
pub struct FlacEncoder {
    program: PathBuf,
    compression_level: u8,
    block_size: u32,
}

impl FlacEncoder {
    /// Use an explicit encoder binary.
    pub fn with_program(program: PathBuf, compression_level: u8, block_size: u32) -> Self {
        Self {
            program,
            compression_level,
            block_size,
        }
    }

    /// Locate `flac` on PATH.
    pub fn locate(compression_level: u8, block_size: u32) -> Result<Self, AudioError> {
        let program =
            which::which("flac").map_err(|e| AudioError::EncoderNotFound(e.to_string()))?;
        Ok(Self::with_program(program, compression_level, block_size))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--no-padding")
            .arg(format!("-{}", self.compression_level))
            .arg(format!("--blocksize={}", self.block_size));
        cmd
    }

    fn check_output(output: std::process::Output) -> Result<Vec<u8>, AudioError> {
        if !output.status.success() {
            return Err(AudioError::CodecFailure(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        if output.stdout.is_empty() {
            return Err(AudioError::CodecFailure(
                "encoder produced no output".to_string(),
            ));
        }
        Ok(output.stdout)
    }
}

impl SoundEncoder for FlacEncoder {
    fn encode_stream(&self, wav_bytes: &[u8]) -> Result<Vec<u8>, AudioError> {
        let mut child = self
            .command()
            .arg("-") // WAV on stdin
            .arg("-c") // FLAC on stdout
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Feed stdin from a separate thread; the encoder streams output
        // while it reads, and a single-threaded write can deadlock on the
        // pipe buffers.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AudioError::CodecFailure("failed to open encoder stdin".to_string()))?;
        let input = wav_bytes.to_vec();
        let feeder = std::thread::spawn(move || {
            // A broken pipe here means the encoder died early; the exit
            // status carries the real diagnostic.
            let _ = stdin.write_all(&input);
        });

        let output = child.wait_with_output()?;
        let _ = feeder.join();
        Self::check_output(output)
    }

    fn encode_file(&self, path: &Path) -> Result<Vec<u8>, AudioError> {
        let output = self
            .command()
            .arg(path)
            .arg("-c")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;
        Self::check_output(output)
    }
}
