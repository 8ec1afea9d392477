use super::{AudioBuffer, AudioError};
use mp3lame_encoder::{Bitrate, Builder, FlushNoGap, InterleavedPcm, MonoPcm, Quality};

fn bitrate_from_kbps(kbps: u32) -> Result<Bitrate, AudioError> {
    let bitrate = match kbps {
        32 => Bitrate::Kbps32,
        48 => Bitrate::Kbps48,
        64 => Bitrate::Kbps64,
        96 => Bitrate::Kbps96,
        128 => Bitrate::Kbps128,
        160 => Bitrate::Kbps160,
        192 => Bitrate::Kbps192,
        256 => Bitrate::Kbps256,
        320 => Bitrate::Kbps320,
        other => {
            return Err(AudioError::Encode(format!(
                "unsupported bitrate {} kbps",
                other
            )))
        }
    };
    Ok(bitrate)
}

/// Whether `kbps` is a bitrate [`encode_mp3`] accepts
pub fn is_supported_bitrate(kbps: u32) -> bool {
    bitrate_from_kbps(kbps).is_ok()
}

/// Encode interleaved PCM (mono or stereo) to a constant-bitrate MP3 stream
pub fn encode_mp3(audio: &AudioBuffer, bitrate_kbps: u32) -> Result<Vec<u8>, AudioError> {
    let channels = audio.format.channels;
    if channels != 1 && channels != 2 {
        return Err(AudioError::Encode(format!(
            "mp3 supports 1 or 2 channels, got {}",
            channels
        )));
    }

    let mut builder =
        Builder::new().ok_or_else(|| AudioError::Encode("failed to create LAME encoder".into()))?;
    builder
        .set_num_channels(channels as u8)
        .map_err(|e| AudioError::Encode(format!("channels: {:?}", e)))?;
    builder
        .set_sample_rate(audio.format.sample_rate)
        .map_err(|e| AudioError::Encode(format!("sample rate: {:?}", e)))?;
    builder
        .set_brate(bitrate_from_kbps(bitrate_kbps)?)
        .map_err(|e| AudioError::Encode(format!("bitrate: {:?}", e)))?;
    builder
        .set_quality(Quality::Good)
        .map_err(|e| AudioError::Encode(format!("quality: {:?}", e)))?;
    let mut encoder = builder
        .build()
        .map_err(|e| AudioError::Encode(format!("{:?}", e)))?;

    let pcm: Vec<i16> = audio
        .samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect();

    let mut output = Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(
        audio.frames(),
    ));

    let encoded = if channels == 1 {
        encoder.encode_to_vec(MonoPcm(&pcm), &mut output)
    } else {
        encoder.encode_to_vec(InterleavedPcm(&pcm), &mut output)
    };
    encoded.map_err(|e| AudioError::Encode(format!("{:?}", e)))?;

    encoder
        .flush_to_vec::<FlushNoGap>(&mut output)
        .map_err(|e| AudioError::Encode(format!("flush: {:?}", e)))?;

    tracing::debug!(
        sample_rate = audio.format.sample_rate,
        channels,
        bitrate_kbps,
        duration_secs = audio.duration_secs(),
        mp3_size_bytes = output.len(),
        "Encoded mp3"
    );

    Ok(output)
}
