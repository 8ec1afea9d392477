//! Audio assembly: decode per-chunk audio, normalise, join in chunk order and
//! re-encode to a single MP3 artifact.

pub mod assembler;
pub mod decoder;
pub mod encoder;
pub mod normalize;

pub use assembler::{AssembledAudio, AudioAssembler};
pub use decoder::decode_segment;
pub use encoder::encode_mp3;
pub use normalize::normalize;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio segments to assemble")]
    Empty,
    #[error("chunk {chunk_index}: could not decode audio: {message}")]
    Decode { chunk_index: usize, message: String },
    #[error(
        "chunk {chunk_index} is {actual} but the track is {expected} and normalization is disabled"
    )]
    FormatMismatch {
        chunk_index: usize,
        expected: AudioFormat,
        actual: AudioFormat,
    },
    #[error("resampling failed: {0}")]
    Resample(String),
    #[error("mp3 encoding failed: {0}")]
    Encode(String),
}

/// Sample rate and channel layout of a PCM buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Hz / {} ch", self.sample_rate, self.channels)
    }
}

/// Interleaved `f32` PCM
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub format: AudioFormat,
    pub samples: Vec<f32>,
}

impl AudioBuffer {
    pub fn new(format: AudioFormat, samples: Vec<f32>) -> Self {
        Self { format, samples }
    }

    pub fn silence(format: AudioFormat, duration_secs: f64) -> Self {
        let frames = (duration_secs * format.sample_rate as f64).round() as usize;
        Self {
            format,
            samples: vec![0.0; frames * format.channels as usize],
        }
    }

    pub fn frames(&self) -> usize {
        match self.format.channels {
            0 => 0,
            n => self.samples.len() / n as usize,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.format.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.format.sample_rate as f64
    }
}

/// Decoded audio for one chunk, tagged with the chunk it came from
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    pub chunk_index: usize,
    pub audio: AudioBuffer,
}

/// Provider output for one chunk, still encoded
#[derive(Debug, Clone)]
pub struct EncodedSegment {
    pub chunk_index: usize,
    pub bytes: Vec<u8>,
}

/// Join segments end to end, in the order given.
///
/// Every segment must already share the first segment's format; mixed input
/// has to go through [`normalize`] first.
pub fn concatenate(segments: Vec<AudioSegment>) -> Result<AudioBuffer, AudioError> {
    let mut iter = segments.into_iter();
    let first = iter.next().ok_or(AudioError::Empty)?;
    let format = first.audio.format;
    let mut samples = first.audio.samples;

    for segment in iter {
        if segment.audio.format != format {
            return Err(AudioError::FormatMismatch {
                chunk_index: segment.chunk_index,
                expected: format,
                actual: segment.audio.format,
            });
        }
        samples.extend(segment.audio.samples);
    }

    Ok(AudioBuffer { format, samples })
}
