//! WAV header inspection for synthesized and extracted audio.
//!
//! Pure functions — no I/O, no async runtime.

/// Sample rate of audio handed to speech recognition (16 kHz mono).
pub const RECOGNITION_SAMPLE_RATE: u32 = 16_000;

const PCM_FORMAT: u16 = 1;

/// Parsed WAV header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Byte offset in the buffer where raw PCM data begins.
    pub data_offset: usize,
    /// Declared size of the `data` chunk.
    pub data_len: u32,
}

impl WavHeader {
    /// Playback length implied by the declared data size.
    pub fn duration_ms(&self) -> u64 {
        let frame_bytes = u64::from(self.channels) * u64::from(self.bits_per_sample / 8);
        let bytes_per_sec = frame_bytes * u64::from(self.sample_rate);
        if bytes_per_sec == 0 {
            return 0;
        }
        u64::from(self.data_len) * 1000 / bytes_per_sec
    }
}

struct Format {
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

fn le_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn le_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

/// Parse a WAV header from the start of a byte buffer.
///
/// Only the header has to be present; PCM data may be truncated. Chunks other
/// than `fmt ` and `data` are skipped, honoring RIFF word padding.
pub fn parse_wav_header(buf: &[u8]) -> Result<WavHeader, &'static str> {
    if buf.len() < 12 {
        return Err("too short for RIFF header");
    }
    if &buf[0..4] != b"RIFF" {
        return Err("missing RIFF tag");
    }
    if &buf[8..12] != b"WAVE" {
        return Err("missing WAVE tag");
    }

    let mut format: Option<Format> = None;
    let mut pos = 12;

    while pos + 8 <= buf.len() {
        let id = &buf[pos..pos + 4];
        let size = le_u32(buf, pos + 4);
        let body = pos + 8;

        match id {
            b"fmt " => {
                if body + 16 > buf.len() {
                    return Err("fmt chunk truncated");
                }
                if le_u16(buf, body) != PCM_FORMAT {
                    return Err("not PCM format");
                }
                format = Some(Format {
                    channels: le_u16(buf, body + 2),
                    sample_rate: le_u32(buf, body + 4),
                    bits_per_sample: le_u16(buf, body + 14),
                });
            }
            b"data" => {
                let fmt = format.ok_or("data chunk before fmt chunk")?;
                return Ok(WavHeader {
                    channels: fmt.channels,
                    sample_rate: fmt.sample_rate,
                    bits_per_sample: fmt.bits_per_sample,
                    data_offset: body,
                    data_len: size,
                });
            }
            _ => {}
        }

        pos = body + size as usize + (size as usize & 1);
    }

    Err("data chunk not found")
}
