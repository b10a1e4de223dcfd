//! 2:1 frame decimation.
//!
//! Keeps every other frame, no anti-alias filter. The target firmware was
//! flashed from images produced this way, so the byte-exact behavior is kept
//! even though a filtered resampler would alias less.

use crate::wav::WavPcm;
use crate::DIRECT_SAMPLE_RATE;

/// Halve the sample rate of a 48 kHz stream by dropping every other frame.
///
/// Output holds `floor(n/2)` frames at 24 kHz with the channel count and
/// sample width unchanged.
pub fn decimate(pcm: &WavPcm) -> WavPcm {
    let frame_size = pcm.frame_size();
    let frame_count = pcm.frame_count();

    let mut frames = Vec::with_capacity(frame_count / 2 * frame_size);
    for i in (0..frame_count).step_by(2) {
        let start = i * frame_size;
        frames.extend_from_slice(&pcm.frames[start..start + frame_size]);
    }

    WavPcm {
        channels: pcm.channels,
        sample_width: pcm.sample_width,
        sample_rate: DIRECT_SAMPLE_RATE,
        frames,
    }
}
