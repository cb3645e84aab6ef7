use core::fmt::Write;

use heapless::String;
use log::debug;

use crate::config::SAMPLES_IN_BUFFER;
use crate::error::{FormatError, SessionError};
use crate::storage::{SoundFile, Storage};
use crate::wave::{WaveHeader, DATA_OFFSET};

pub type SoundId = u32;

/// Played by the dispatcher when the link comes up.
pub const SOUND_CONNECTED: SoundId = 0;
/// Played by the dispatcher when the link drops.
pub const SOUND_DISCONNECTED: SoundId = 1;

/// Long enough for `ffffffff.wav`.
pub type FileName = String<12>;

/// Sound files have lowercase hex names, e.g. sound 91 is `5b.wav`.
pub fn sound_file_name(sound: SoundId) -> FileName {
    let mut name = FileName::new();
    // capacity covers every u32, so this cannot fail
    let _ = write!(name, "{:x}.wav", sound);
    name
}

/// The file currently feeding the fill handler, if any.
///
/// Lives behind the engine's session lock: `play` takes it blocking, the fill
/// handler only ever with `try_lock`.
pub struct StreamSession<S: Storage> {
    storage: S,
    file: Option<S::File>,
    remaining_samples: u32,
}

impl<S: Storage> StreamSession<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            file: None,
            remaining_samples: 0,
        }
    }

    #[inline(always)]
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    #[inline(always)]
    pub fn remaining_samples(&self) -> u32 {
        self.remaining_samples
    }

    /// Closing a closed session does nothing.
    pub fn close(&mut self) {
        if let Some(file) = self.file.take() {
            file.close();
            debug!("sound session closed with {} samples left", self.remaining_samples);
        }
        self.remaining_samples = 0;
    }

    /// Replaces the current session with `name`.
    ///
    /// On any error the session is left closed.
    pub fn start(&mut self, name: &str) -> Result<WaveHeader, SessionError> {
        self.close();

        let mut file = self.storage.open(name).map_err(SessionError::Open)?;

        let header = match WaveHeader::read(&mut file) {
            Ok(header) => header,
            Err(e) => {
                file.close();
                return Err(e.into());
            }
        };

        if let Err(e) = file.seek(DATA_OFFSET) {
            file.close();
            return Err(FormatError::Io(e).into());
        }

        self.remaining_samples = header.samples();
        self.file = Some(file);
        Ok(header)
    }

    /// Reads the next run of raw samples into the front of `buf`.
    ///
    /// Reads at most `SAMPLES_IN_BUFFER` samples. Returns how many whole
    /// samples arrived. The session closes itself once the declared data is
    /// used up, or the file ends or fails first.
    pub fn read_into(&mut self, buf: &mut [u16]) -> usize {
        let Some(file) = self.file.as_mut() else {
            return 0;
        };

        let wanted = (self.remaining_samples as usize).min(SAMPLES_IN_BUFFER).min(buf.len());
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut buf[..wanted]);
        let bytes_to_read = bytes.len();

        let bytes_read = match file.read(bytes) {
            Ok(n) => n.min(bytes_to_read),
            Err(e) => {
                debug!("sound read failed: {e}");
                0
            }
        };

        let samples = bytes_read / 2;
        self.remaining_samples -= samples as u32;

        if self.remaining_samples == 0 || bytes_read < bytes_to_read {
            self.close();
        }

        samples
    }
}
