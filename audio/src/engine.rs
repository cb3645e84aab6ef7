//! # Streaming
//!
//! Playback never waits on the SD card. The transfer engine plays one buffer
//! while the fill handler prepares the other, one full buffer period ahead:
//!
//! ```text
//!   transfer complete (highest)        fill pending (lowest)
//!   ---------------------------        ----------------------------------
//!   swap playback <-> write            clear fill pending
//!   restart transfer on playback       try_lock session, read
//!   raise fill pending          ---->  still the write buffer? else underrun
//!   acknowledge                        expand, pad with silence
//! ```
//!
//! `play` takes the session lock blocking; the fill handler only ever tries.
//! If the fill handler loses the race, that buffer is silence and the next
//! period picks up the new session from its first sample.

use log::{error, info, warn};
use spin::Mutex;

use crate::buffers::DoubleBuffer;
use crate::config::{OUTPUT, SAMPLE_RATE};
use crate::convert::{expand_in_place, SILENCE};
use crate::driver::{InterruptController, IrqSource, PlaybackDriver, Priority};
use crate::error::InitError;
use crate::session::{sound_file_name, SoundId, StreamSession};
use crate::storage::Storage;

pub struct AudioEngine<S: Storage, D: PlaybackDriver, I: InterruptController> {
    pub(crate) driver: D,
    pub(crate) interrupts: I,
    pub(crate) buffers: DoubleBuffer,
    pub(crate) session: Mutex<StreamSession<S>>,
}

impl<S: Storage, D: PlaybackDriver, I: InterruptController> AudioEngine<S, D, I> {
    /// Mounts storage, reserves the fill interrupt, programs the output and
    /// enables both interrupt sources. Nothing plays until [`Self::start`].
    pub fn new(mut storage: S, mut driver: D, mut interrupts: I) -> Result<Self, InitError> {
        storage.mount().map_err(InitError::MountFailed)?;
        interrupts.claim()?;
        driver.configure(&OUTPUT)?;

        interrupts.enable(IrqSource::TransferComplete, Priority::Highest);
        interrupts.enable(IrqSource::FillPending, Priority::Lowest);

        Ok(Self {
            driver,
            interrupts,
            buffers: DoubleBuffer::new(),
            session: Mutex::new(StreamSession::new(storage)),
        })
    }

    /// Kicks off the first transfer. Later transfers are restarted by the
    /// swap handler.
    ///
    /// The engine must already be at its final address: the hardware keeps
    /// reading the buffers in place.
    pub fn start(&self) {
        self.driver.start(self.buffers.playback_ptr());
    }

    pub fn handle(&self, source: IrqSource) {
        match source {
            IrqSource::TransferComplete => self.on_transfer_complete(),
            IrqSource::FillPending => self.on_fill_pending(),
        }
    }

    /// Swap handler. Runs at the highest priority and must finish before the
    /// next PWM wrap.
    pub fn on_transfer_complete(&self) {
        // the completion line is shared with other channels
        if !self.driver.owns_completion() {
            return;
        }

        let playback = self.buffers.swap();
        self.driver.start(playback);

        self.interrupts.set_pending(IrqSource::FillPending);
        self.driver.acknowledge();
    }

    /// Fill handler. Runs at the lowest priority and may be preempted by
    /// anything, including the swap handler.
    ///
    /// If a swap overtakes the fill, the buffer being filled is already
    /// playing. The fill stops writing to it and leaves the swap's new fill
    /// request pending, so the next buffer is still prepared.
    pub fn on_fill_pending(&self) {
        // before any work: a swap from here on raises a request that must survive
        self.interrupts.clear_pending(IrqSource::FillPending);

        let index = self.buffers.write_index();
        // SAFETY: this handler is the only caller and does not preempt itself.
        // The index is checked against playback before every write below.
        let buffer = unsafe { self.buffers.buffer_mut(index) };

        // Never block here: a `play` holding the lock may be what we
        // preempted. It is about to change the sound anyway, so output silence.
        let samples = match self.session.try_lock() {
            Some(mut session) => session.read_into(buffer),
            None => 0,
        };

        if self.buffers.playback_index() == index {
            warn!("audio: buffer underrun, {samples} samples dropped");
            return;
        }

        let written = expand_in_place(buffer, samples);
        buffer[written..].fill(SILENCE);
    }

    /// Stops the current sound and starts streaming `sound`.
    ///
    /// Blocks on the session lock, which the fill handler only holds for a
    /// single read. Failures are logged; the speaker stays silent.
    pub fn play(&self, sound: SoundId) {
        let name = sound_file_name(sound);
        let mut session = self.session.lock();

        match session.start(&name) {
            Ok(header) => {
                info!("playing audio file \"{name}\"");
                if header.sample_rate != SAMPLE_RATE {
                    warn!(
                        "audio file \"{name}\" has a sample rate of {} Hz but will be played at {} Hz",
                        header.sample_rate, SAMPLE_RATE
                    );
                }
            }
            Err(e) => error!("audio file \"{name}\": {e}"),
        }
    }

    /// Whether a sound is playing. `None` while `play` or the fill handler
    /// holds the session; safe to call from any context.
    pub fn is_streaming(&self) -> Option<bool> {
        self.session.try_lock().map(|session| session.is_open())
    }

    /// Samples of the current sound not yet read, `None` while the session is
    /// busy.
    pub fn remaining_samples(&self) -> Option<u32> {
        self.session.try_lock().map(|session| session.remaining_samples())
    }
}
