use super::{
    concatenate, decode_segment, encode_mp3, normalize, AudioError, AudioFormat, AudioSegment,
    EncodedSegment,
};

/// Final single-file audio for one story
#[derive(Debug, Clone)]
pub struct AssembledAudio {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
    pub duration_secs: f64,
    pub segment_count: usize,
}

/// Decodes per-chunk provider audio and joins it into one MP3.
///
/// With normalization on, every segment is converted to `target` before
/// concatenation. With it off, segments must already agree with each other
/// and the first segment's format is kept.
#[derive(Debug, Clone)]
pub struct AudioAssembler {
    target: AudioFormat,
    normalize: bool,
    bitrate_kbps: u32,
}

impl AudioAssembler {
    pub fn new(target: AudioFormat, normalize: bool, bitrate_kbps: u32) -> Self {
        Self {
            target,
            normalize,
            bitrate_kbps,
        }
    }

    pub fn assemble(&self, mut segments: Vec<EncodedSegment>) -> Result<AssembledAudio, AudioError> {
        if segments.is_empty() {
            return Err(AudioError::Empty);
        }

        segments.sort_by_key(|s| s.chunk_index);
        let segment_count = segments.len();

        let decoded = segments
            .iter()
            .map(|s| decode_segment(s.chunk_index, &s.bytes))
            .collect::<Result<Vec<AudioSegment>, _>>()?;

        let decoded = if self.normalize {
            decoded
                .into_iter()
                .map(|segment| normalize(segment, self.target))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            decoded
        };

        let track = concatenate(decoded)?;
        let bytes = encode_mp3(&track, self.bitrate_kbps)?;

        tracing::info!(
            segment_count,
            sample_rate = track.format.sample_rate,
            channels = track.format.channels,
            duration_secs = track.duration_secs(),
            audio_size_bytes = bytes.len(),
            "Audio assembled"
        );

        Ok(AssembledAudio {
            bytes,
            format: track.format,
            duration_secs: track.duration_secs(),
            segment_count,
        })
    }
}
