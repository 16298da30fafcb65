use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;

/// Rewrites in-memory WAV audio as 16-bit PCM at `sample_rate` with `channels`.
///
/// Providers answer at their own native rate; segments of one track must share a
/// layout before they can be joined. Audio already in the requested layout is
/// returned untouched. Sources are mixed down to mono first, so multi-channel
/// targets carry the same signal on every channel.
pub fn conform_wav(wav: &[u8], sample_rate: u32, channels: u16) -> Result<Vec<u8>, hound::Error> {
    let mut reader = WavReader::new(Cursor::new(wav))?;
    let source = reader.spec();
    let target = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    if source == target {
        return Ok(wav.to_vec());
    }

    let samples: Vec<f32> = match source.sample_format {
        SampleFormat::Int => {
            let scale = (1i64 << (source.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
    };

    let mono = mix_down(&samples, source.channels);
    let resampled = resample_linear(&mono, source.sample_rate, sample_rate);

    let mut cursor = Cursor::new(Vec::with_capacity(resampled.len() * 2 * channels as usize + 44));
    {
        let mut writer = WavWriter::new(&mut cursor, target)?;
        for value in resampled {
            let sample = (value * i16::MAX as f32)
                .round()
                .clamp(i16::MIN as f32, i16::MAX as f32) as i16;
            for _ in 0..channels {
                writer.write_sample(sample)?;
            }
        }
        writer.finalize()?;
    }

    tracing::debug!(
        from_rate = source.sample_rate,
        from_channels = source.channels,
        to_rate = sample_rate,
        to_channels = channels,
        "Conformed WAV segment"
    );

    Ok(cursor.into_inner())
}

/// Average interleaved frames into one channel.
fn mix_down(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels as usize)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Linear interpolation between neighbouring frames; output length scales with the rate ratio.
fn resample_linear(input: &[f32], from: u32, to: u32) -> Vec<f32> {
    if from == to || from == 0 || input.is_empty() {
        return input.to_vec();
    }

    let out_len = (input.len() as u64 * to as u64 / from as u64) as usize;
    let step = from as f64 / to as f64;
    let last = input.len() - 1;

    (0..out_len)
        .map(|i| {
            let position = i as f64 * step;
            let left = (position.floor() as usize).min(last);
            let right = (left + 1).min(last);
            let fraction = (position - left as f64) as f32;
            input[left] + (input[right] - input[left]) * fraction
        })
        .collect()
}
