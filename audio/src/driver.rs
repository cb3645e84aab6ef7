//! Hardware seams.
//!
//! Everything the engine does to hardware goes through these two traits, so
//! the engine can run on the host against recording fakes. Methods called
//! from interrupt context take `&self`; register writes are volatile and need
//! no exclusive borrow.

use crate::config::OutputConfig;
use crate::error::InitError;

/// Named interrupt sources the engine reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrqSource {
    /// The transfer engine finished the playback buffer. Shared with other
    /// channels on the same completion line.
    TransferComplete,
    /// Software-raised request to refill the write buffer.
    FillPending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Priority {
    /// Nothing may delay the buffer swap, or the speaker glitches.
    Highest,
    /// File reads happen here; everything else may preempt it.
    Lowest,
}

/// Free-running PWM output fed by a chained transfer engine.
pub trait PlaybackDriver {
    /// Claims the transfer channel and programs PWM and transfer engine for
    /// `output`. Must not start the transfer.
    fn configure(&mut self, output: &OutputConfig) -> Result<(), InitError>;

    /// Starts transferring the buffer at `buffer` to the compare register, one
    /// slot per PWM period, for the buffer length given to `configure`.
    /// Returns immediately; the hardware keeps reading until the completion
    /// interrupt.
    ///
    /// Takes an address rather than a slice: the swap handler may preempt a
    /// fill that still holds this buffer mutably borrowed.
    fn start(&self, buffer: *const u16);

    /// Whether a pending completion belongs to this driver's channel.
    fn owns_completion(&self) -> bool;

    /// Clears this driver's completion flag.
    fn acknowledge(&self);
}

pub trait InterruptController {
    /// Reserves the software interrupt used for [`IrqSource::FillPending`].
    fn claim(&mut self) -> Result<(), InitError>;

    fn enable(&mut self, source: IrqSource, priority: Priority);

    fn set_pending(&self, source: IrqSource);

    fn clear_pending(&self, source: IrqSource);
}
