use super::{AudioBuffer, AudioError, AudioFormat, AudioSegment};
use rubato::{FastFixedIn, PolynomialDegree, Resampler};

const RESAMPLE_CHUNK_SIZE: usize = 1024;

/// Convert a segment to `target` (channel layout first, then sample rate)
pub fn normalize(segment: AudioSegment, target: AudioFormat) -> Result<AudioSegment, AudioError> {
    if segment.audio.format == target {
        return Ok(segment);
    }

    tracing::debug!(
        chunk_index = segment.chunk_index,
        from = %segment.audio.format,
        to = %target,
        "Normalizing audio segment"
    );

    let remixed = remix(&segment.audio, target.channels);
    let audio = resample(remixed, target.sample_rate)?;

    Ok(AudioSegment {
        chunk_index: segment.chunk_index,
        audio,
    })
}

fn remix(audio: &AudioBuffer, channels: u16) -> AudioBuffer {
    let source = audio.format.channels as usize;
    let target = channels as usize;
    let format = AudioFormat {
        sample_rate: audio.format.sample_rate,
        channels,
    };

    if source == target {
        return AudioBuffer::new(format, audio.samples.clone());
    }

    let samples = audio
        .samples
        .chunks_exact(source)
        .flat_map(|frame| {
            let mixed: Vec<f32> = if target == 1 {
                vec![frame.iter().sum::<f32>() / source as f32]
            } else if source == 1 {
                vec![frame[0]; target]
            } else {
                (0..target).map(|c| frame[c.min(source - 1)]).collect()
            };
            mixed
        })
        .collect();

    AudioBuffer::new(format, samples)
}

fn resample(audio: AudioBuffer, sample_rate: u32) -> Result<AudioBuffer, AudioError> {
    let source_rate = audio.format.sample_rate;
    if source_rate == sample_rate {
        return Ok(audio);
    }

    let channels = audio.format.channels as usize;
    let frames = audio.frames();
    let ratio = sample_rate as f64 / source_rate as f64;

    let planar: Vec<Vec<f32>> = (0..channels)
        .map(|c| audio.samples.iter().skip(c).step_by(channels).copied().collect())
        .collect();

    let mut resampler = FastFixedIn::<f32>::new(
        ratio,
        1.0,
        PolynomialDegree::Cubic,
        RESAMPLE_CHUNK_SIZE,
        channels,
    )
    .map_err(|e| AudioError::Resample(e.to_string()))?;

    let mut output: Vec<Vec<f32>> = vec![Vec::new(); channels];
    let mut append = |block: Vec<Vec<f32>>| {
        for (out, channel) in output.iter_mut().zip(block) {
            out.extend(channel);
        }
    };

    let mut pos = 0;
    while pos + RESAMPLE_CHUNK_SIZE <= frames {
        let input: Vec<&[f32]> = planar
            .iter()
            .map(|c| &c[pos..pos + RESAMPLE_CHUNK_SIZE])
            .collect();
        let block = resampler
            .process(input.as_slice(), None)
            .map_err(|e| AudioError::Resample(e.to_string()))?;
        append(block);
        pos += RESAMPLE_CHUNK_SIZE;
    }

    if pos < frames {
        let input: Vec<&[f32]> = planar.iter().map(|c| &c[pos..]).collect();
        let block = resampler
            .process_partial(Some(input.as_slice()), None)
            .map_err(|e| AudioError::Resample(e.to_string()))?;
        append(block);
    }

    // drain what the resampler still holds back
    let tail = resampler
        .process_partial::<&[f32]>(None, None)
        .map_err(|e| AudioError::Resample(e.to_string()))?;
    append(tail);

    let delay = resampler.output_delay();
    let expected = (frames as f64 * ratio).round() as usize;

    for channel in output.iter_mut() {
        channel.drain(..delay.min(channel.len()));
        channel.resize(expected, 0.0);
    }

    let mut samples = Vec::with_capacity(expected * channels);
    for i in 0..expected {
        for channel in &output {
            samples.push(channel[i]);
        }
    }

    Ok(AudioBuffer::new(
        AudioFormat {
            sample_rate,
            channels: audio.format.channels,
        },
        samples,
    ))
}
