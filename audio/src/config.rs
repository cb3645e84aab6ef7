//! # Output timing
//!
//! The PWM slice wraps every `2^BITS_PER_SAMPLE` clock ticks, and each decoded
//! sample is held for `PWM_CYCLES_PER_SAMPLE` wraps:
//!
//! | Constant | Value |
//! |----------|-------|
//! | PWM frequency | 125 MHz / 2^10 = 122.070 kHz |
//! | Sample rate | 122070 / 4 = 30.517 kHz |
//! | Buffer period | 512 samples ≈ 16.8 ms |
//!
//! Raising `BITS_PER_SAMPLE` by one halves the sample rate; lowering
//! `PWM_CYCLES_PER_SAMPLE` doubles it. Any change must keep
//! `CLOCK_HZ / 2^BITS_PER_SAMPLE / PWM_CYCLES_PER_SAMPLE` in the audible range.

/// Timing base of the PWM slice.
pub const CLOCK_HZ: u32 = 125_000_000;

/// Duty-cycle resolution of the output.
pub const BITS_PER_SAMPLE: u32 = 10;

/// Number of PWM periods each decoded sample is held for.
pub const PWM_CYCLES_PER_SAMPLE: usize = 4;

/// Decoded samples per buffer.
pub const SAMPLES_IN_BUFFER: usize = 512;

/// GPIO driving the speaker filter.
pub const AUDIO_PIN: u8 = 16;

pub const OUTPUT: OutputConfig = OutputConfig {
    clock_hz: CLOCK_HZ,
    bits_per_sample: BITS_PER_SAMPLE,
    cycles_per_sample: PWM_CYCLES_PER_SAMPLE,
    samples_in_buffer: SAMPLES_IN_BUFFER,
    pin: AUDIO_PIN,
};

pub const SAMPLE_RATE: u32 = OUTPUT.sample_rate();

/// Length of each output buffer, in PWM periods.
pub const AUDIO_BUFFER_SIZE: usize = OUTPUT.buffer_len();

/// Everything a playback driver needs to program the output path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub clock_hz: u32,
    pub bits_per_sample: u32,
    pub cycles_per_sample: usize,
    pub samples_in_buffer: usize,
    pub pin: u8,
}

impl OutputConfig {
    /// Counter top value: the slice counts `0..=wrap` once per output period.
    #[inline(always)]
    pub const fn wrap(&self) -> u16 {
        ((1u32 << self.bits_per_sample) - 1) as u16
    }

    /// Rate at which decoded samples reach the speaker.
    #[inline(always)]
    pub const fn sample_rate(&self) -> u32 {
        self.clock_hz / (1 << self.bits_per_sample) / self.cycles_per_sample as u32
    }

    #[inline(always)]
    pub const fn buffer_len(&self) -> usize {
        self.samples_in_buffer * self.cycles_per_sample
    }
}
