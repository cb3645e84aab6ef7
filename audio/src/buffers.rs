use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::config::AUDIO_BUFFER_SIZE;
use crate::convert::SILENCE;

pub type Buffer = [u16; AUDIO_BUFFER_SIZE];

/// Two output buffers with alternating owners.
///
/// `playback` is the index of the buffer the transfer engine is reading;
/// the other one belongs to the fill handler. Swapping only flips the index.
pub struct DoubleBuffer {
    buffers: [UnsafeCell<Buffer>; 2],
    playback: AtomicUsize,
}

// Only the fill handler borrows a buffer mutably (`buffer_mut`). The swap
// handler works on addresses and the index alone.
unsafe impl Sync for DoubleBuffer {}

impl DoubleBuffer {
    pub const fn new() -> Self {
        Self {
            buffers: [UnsafeCell::new([SILENCE; AUDIO_BUFFER_SIZE]), UnsafeCell::new([SILENCE; AUDIO_BUFFER_SIZE])],
            playback: AtomicUsize::new(0),
        }
    }

    #[inline(always)]
    pub fn playback_index(&self) -> usize {
        self.playback.load(Ordering::Acquire)
    }

    /// Index of the buffer the fill handler may write right now.
    #[inline(always)]
    pub fn write_index(&self) -> usize {
        self.playback_index() ^ 1
    }

    /// The buffer the transfer engine reads from.
    #[inline(always)]
    pub fn playback(&self) -> &Buffer {
        unsafe { &*self.buffers[self.playback_index()].get() }
    }

    /// Start of the buffer the transfer engine reads from.
    #[inline(always)]
    pub fn playback_ptr(&self) -> *const u16 {
        self.buffers[self.playback_index()].get().cast::<u16>().cast_const()
    }

    /// Hands the write buffer to playback and returns its start address.
    ///
    /// Only the swap handler calls this. It never preempts itself, so a plain
    /// load/store pair is enough. No reference to either buffer is formed, so
    /// a fill handler it preempts keeps a valid borrow.
    #[inline(always)]
    pub fn swap(&self) -> *const u16 {
        let next = self.playback.load(Ordering::Relaxed) ^ 1;
        self.playback.store(next, Ordering::Release);
        self.buffers[next].get().cast::<u16>().cast_const()
    }

    /// Buffer `index`, for writing.
    ///
    /// # Safety
    /// Only the fill handler may call this, with the index it got from
    /// [`Self::write_index`], and only one such borrow may exist at a time.
    /// A swap may hand the buffer to the transfer engine while the borrow is
    /// alive: the caller must compare `index` against
    /// [`Self::playback_index`] before each further write and stop once they
    /// match.
    #[inline(always)]
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn buffer_mut(&self, index: usize) -> &mut Buffer {
        unsafe { &mut *self.buffers[index & 1].get() }
    }
}

impl Default for DoubleBuffer {
    fn default() -> Self {
        Self::new()
    }
}
