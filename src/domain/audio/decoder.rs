use super::{AudioBuffer, AudioError, AudioFormat, AudioSegment};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decode one chunk's provider output (MP3 or WAV) into interleaved PCM
pub fn decode_segment(chunk_index: usize, data: &[u8]) -> Result<AudioSegment, AudioError> {
    let decode_err = |message: String| AudioError::Decode {
        chunk_index,
        message,
    };

    if data.is_empty() {
        return Err(decode_err("empty audio payload".to_string()));
    }

    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    if data.starts_with(b"RIFF") {
        hint.with_extension("wav");
    } else {
        hint.with_extension("mp3");
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| decode_err(format!("probe failed: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| decode_err("no audio track found".to_string()))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut channels = track.codec_params.channels.map(|c| c.count() as u16);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| decode_err(format!("decoder creation failed: {}", e)))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(decode_err(format!("packet read error: {}", e))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!(chunk_index, error = e, "Skipping undecodable packet");
                continue;
            }
            Err(e) => return Err(decode_err(format!("decode failed: {}", e))),
        };

        let spec = *decoded.spec();
        sample_rate.get_or_insert(spec.rate);
        channels.get_or_insert(spec.channels.count() as u16);

        let num_frames = decoded.frames();
        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        let actual_samples = num_frames * spec.channels.count();
        samples.extend(&sample_buf.samples()[..actual_samples]);
    }

    let sample_rate = sample_rate.ok_or_else(|| decode_err("unknown sample rate".to_string()))?;
    let channels = channels.ok_or_else(|| decode_err("unknown channel count".to_string()))?;

    if samples.is_empty() || channels == 0 {
        return Err(decode_err("no audio frames decoded".to_string()));
    }

    let audio = AudioBuffer::new(
        AudioFormat {
            sample_rate,
            channels,
        },
        samples,
    );

    tracing::debug!(
        chunk_index,
        sample_rate,
        channels,
        duration_secs = audio.duration_secs(),
        "Decoded audio segment"
    );

    Ok(AudioSegment { chunk_index, audio })
}
