//! # Blockcraft Audio
//!
//! Streams mono 16-bit WAV files from the SD card to a PWM pin, for the
//! connect/disconnect chimes and command-triggered sounds of the Blockcraft
//! base.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use blockcraft_audio::{Audio, IrqSource, SOUND_CONNECTED};
//! use blockcraft_audio::hw::{Rp2040Interrupts, Rp2040Output};
//!
//! static AUDIO: Audio<SdVolume, Rp2040Output, Rp2040Interrupts> = Audio::new();
//!
//! // once, from main
//! AUDIO.init(SdVolume::new(), Rp2040Output::new(), Rp2040Interrupts::new());
//!
//! // from the command dispatcher
//! AUDIO.play(SOUND_CONNECTED);
//!
//! // vector table entries
//! #[unsafe(no_mangle)]
//! extern "C" fn DMA_IRQ_1() { AUDIO.on_interrupt(IrqSource::TransferComplete) }
//! #[unsafe(no_mangle)]
//! extern "C" fn SPARE_IRQ_0() { AUDIO.on_interrupt(IrqSource::FillPending) }
//! ```
//!
//! ## Sound Files
//!
//! Sound `n` lives in the volume root as `<n in lowercase hex>.wav`, e.g.
//! sound 91 is `5b.wav`. Files must be RIFF/WAVE, PCM, mono, 16-bit, with the
//! canonical 44-byte header. Other sample rates play at
//! [`SAMPLE_RATE`](config::SAMPLE_RATE) anyway, at the wrong pitch.

#![no_std]

#[cfg(test)]
extern crate std;

use core::sync::atomic::{AtomicBool, Ordering};

use log::{error, info};
use spin::Once;

pub mod buffers;
pub mod config;
pub mod convert;
pub mod driver;
pub mod engine;
pub mod error;
pub mod session;
pub mod storage;
pub mod wave;

#[cfg(feature = "rp2040")]
pub mod hw;

#[cfg(test)]
mod testing;

pub use driver::{InterruptController, IrqSource, PlaybackDriver, Priority};
pub use engine::AudioEngine;
pub use error::{FileError, FormatError, InitError};
pub use session::{SoundId, SOUND_CONNECTED, SOUND_DISCONNECTED};
pub use storage::{SoundFile, Storage};

/// The engine as seen by the rest of the firmware.
///
/// Meant to live in a `static`: `init` builds the engine in place, and the
/// interrupt vectors reach it through [`Audio::on_interrupt`].
pub struct Audio<S: Storage, D: PlaybackDriver, I: InterruptController> {
    engine: Once<AudioEngine<S, D, I>>,
    disabled: AtomicBool,
}

impl<S: Storage, D: PlaybackDriver, I: InterruptController> Audio<S, D, I> {
    pub const fn new() -> Self {
        Self {
            engine: Once::new(),
            disabled: AtomicBool::new(false),
        }
    }

    /// Brings up storage and the output path and starts playing silence.
    ///
    /// Returns whether audio is available. Calling again after success does
    /// nothing. After a failure audio stays off for good.
    pub fn init(&self, storage: S, driver: D, interrupts: I) -> bool {
        if self.engine.is_completed() {
            return true;
        }
        if self.disabled.load(Ordering::Acquire) {
            return false;
        }

        match self.engine.try_call_once(|| AudioEngine::new(storage, driver, interrupts)) {
            Ok(engine) => {
                info!("audio: initialisation successful");
                engine.start();
                true
            }
            Err(e) => {
                error!("audio: {e}. continuing without audio");
                self.disabled.store(true, Ordering::Release);
                false
            }
        }
    }

    /// Plays `sound`, cutting off whatever was playing. Does nothing if
    /// audio is unavailable.
    pub fn play(&self, sound: SoundId) {
        match self.engine.get() {
            Some(engine) => engine.play(sound),
            None => error!("audio: can't play sound {sound}, audio not initialised"),
        }
    }

    /// Entry point for both interrupt vectors.
    #[inline(always)]
    pub fn on_interrupt(&self, source: IrqSource) {
        if let Some(engine) = self.engine.get() {
            engine.handle(source);
        }
    }

    pub fn engine(&self) -> Option<&AudioEngine<S, D, I>> {
        self.engine.get()
    }
}

impl<S: Storage, D: PlaybackDriver, I: InterruptController> Default for Audio<S, D, I> {
    fn default() -> Self {
        Self::new()
    }
}
