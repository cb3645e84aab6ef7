use crate::config::{BITS_PER_SAMPLE, PWM_CYCLES_PER_SAMPLE};

const SHIFT: u32 = 16 - BITS_PER_SAMPLE;
const MASK: u32 = (1 << BITS_PER_SAMPLE) - 1;

/// Duty-cycle code for amplitude zero. Unused slots are padded with this,
/// not with raw zero, so the speaker idles at the same bias as real audio.
pub const SILENCE: u16 = convert(0);

/// Maps a signed 16-bit sample to an unsigned `BITS_PER_SAMPLE` duty code.
///
/// Adds the half-range bias, then truncates the low `16 - BITS_PER_SAMPLE`
/// bits. No dithering.
#[inline(always)]
pub const fn convert(sample: i16) -> u16 {
    let biased = (sample as i32 + (1 << 15)) as u32;
    ((biased >> SHIFT) & MASK) as u16
}

/// Expands the first `count` raw samples of `buf` in place.
///
/// On entry `buf[..count]` holds little-endian signed 16-bit samples straight
/// from the file. On return `buf[..count * PWM_CYCLES_PER_SAMPLE]` holds each
/// converted sample repeated `PWM_CYCLES_PER_SAMPLE` times. Runs back to front:
/// sample `i` lands at `i * PWM_CYCLES_PER_SAMPLE >= i`, so every source slot
/// is read before anything overwrites it.
///
/// Returns the number of slots written.
pub fn expand_in_place(buf: &mut [u16], count: usize) -> usize {
    let count = count.min(buf.len() / PWM_CYCLES_PER_SAMPLE);

    for index in (0..count).rev() {
        let raw = i16::from_le(buf[index] as i16);
        let code = convert(raw);
        let start = index * PWM_CYCLES_PER_SAMPLE;
        buf[start..start + PWM_CYCLES_PER_SAMPLE].fill(code);
    }

    count * PWM_CYCLES_PER_SAMPLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_is_mid_scale() {
        assert_eq!(SILENCE, 512);
        assert_ne!(SILENCE, 0);
        assert_eq!(convert(0), convert(0));
    }

    #[test]
    fn extremes() {
        assert_eq!(convert(i16::MIN), 0);
        assert_eq!(convert(i16::MAX), 1023);
        assert_eq!(convert(-1), 511);
    }

    #[test]
    fn quantization_error_is_bounded() {
        let step = 1i32 << SHIFT;
        for s in i16::MIN..=i16::MAX {
            let level = ((convert(s) as i32) << SHIFT) - (1 << 15);
            assert!((s as i32 - level).abs() <= step, "sample {s} decoded to {level}");
        }
    }

    #[test]
    fn expands_back_to_front() {
        let mut buf = [0u16; 16];
        let samples: [i16; 3] = [i16::MIN, 0, i16::MAX];
        for (slot, s) in buf.iter_mut().zip(samples) {
            *slot = s.to_le() as u16;
        }

        let written = expand_in_place(&mut buf, samples.len());

        assert_eq!(written, 12);
        assert_eq!(&buf[0..4], &[0; 4]);
        assert_eq!(&buf[4..8], &[SILENCE; 4]);
        assert_eq!(&buf[8..12], &[1023; 4]);
        // untouched tail
        assert_eq!(&buf[12..], &[0; 4]);
    }

    #[test]
    fn expanding_nothing_is_a_no_op() {
        let mut buf = [7u16; 8];
        assert_eq!(expand_in_place(&mut buf, 0), 0);
        assert_eq!(buf, [7; 8]);
    }
}
