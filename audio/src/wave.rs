//! Canonical 44-byte RIFF/WAVE header.
//!
//! ```text
//!  0  "RIFF"          20  audio format (1 = PCM)   34  bits per sample
//!  4  chunk size      22  channels                 36  "data"
//!  8  "WAVE"          24  sample rate              40  data size
//! 12  "fmt "          28  byte rate                44  samples...
//! 16  fmt size        32  block align
//! ```
//!
//! Only the fixed layout is supported; there is no chunk walking, so files
//! with extra chunks before `data` are misread.

use crate::error::FormatError;
use crate::storage::SoundFile;

pub const CHUNK_ID_OFFSET: u32 = 0;
pub const FORMAT_OFFSET: u32 = 8;
pub const AUDIO_FORMAT_OFFSET: u32 = 20;
pub const CHANNELS_OFFSET: u32 = 22;
pub const SAMPLE_RATE_OFFSET: u32 = 24;
pub const BITS_PER_SAMPLE_OFFSET: u32 = 34;
pub const DATA_SIZE_OFFSET: u32 = 40;
pub const DATA_OFFSET: u32 = 44;

pub const AUDIO_FORMAT_PCM: u16 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveHeader {
    pub sample_rate: u32,
    /// Size of the sample data in bytes.
    pub data_size: u32,
}

impl WaveHeader {
    /// Validates the header of `file`, field by field in a fixed order.
    ///
    /// Leaves the read position somewhere inside the header.
    pub fn read<F: SoundFile>(file: &mut F) -> Result<Self, FormatError> {
        if read_bytes::<F, 4>(file, CHUNK_ID_OFFSET)? != *b"RIFF" {
            return Err(FormatError::NotRiff);
        }

        if read_bytes::<F, 4>(file, FORMAT_OFFSET)? != *b"WAVE" {
            return Err(FormatError::NotWave);
        }

        let audio_format = read_u16(file, AUDIO_FORMAT_OFFSET)?;
        if audio_format != AUDIO_FORMAT_PCM {
            return Err(FormatError::NotPcm(audio_format));
        }

        let channels = read_u16(file, CHANNELS_OFFSET)?;
        if channels != 1 {
            return Err(FormatError::Channels(channels));
        }

        let bits_per_sample = read_u16(file, BITS_PER_SAMPLE_OFFSET)?;
        if bits_per_sample != 16 {
            return Err(FormatError::BitsPerSample(bits_per_sample));
        }

        Ok(Self {
            sample_rate: read_u32(file, SAMPLE_RATE_OFFSET)?,
            data_size: read_u32(file, DATA_SIZE_OFFSET)?,
        })
    }

    /// Number of 16-bit mono samples in the data chunk.
    #[inline(always)]
    pub fn samples(&self) -> u32 {
        self.data_size / 2
    }
}

/// A field cut short by the end of the file is `Truncated`; a failing card
/// is `Io`.
fn read_bytes<F: SoundFile, const N: usize>(file: &mut F, offset: u32) -> Result<[u8; N], FormatError> {
    let mut buf = [0u8; N];
    file.seek(offset).map_err(FormatError::Io)?;
    match file.read(&mut buf).map_err(FormatError::Io)? {
        n if n == N => Ok(buf),
        _ => Err(FormatError::Truncated),
    }
}

fn read_u16<F: SoundFile>(file: &mut F, offset: u32) -> Result<u16, FormatError> {
    read_bytes(file, offset).map(u16::from_le_bytes)
}

fn read_u32<F: SoundFile>(file: &mut F, offset: u32) -> Result<u32, FormatError> {
    read_bytes(file, offset).map(u32::from_le_bytes)
}
