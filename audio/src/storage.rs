//! The engine only needs a flat volume of byte-stream files. The block device
//! and FAT driver live with the board support code and plug in here.

use crate::error::FileError;

pub trait Storage {
    type File: SoundFile;

    /// Makes the volume ready. Called once, from `init`.
    fn mount(&mut self) -> Result<(), FileError>;

    /// Opens `name` in the volume root for reading.
    fn open(&mut self, name: &str) -> Result<Self::File, FileError>;
}

pub trait SoundFile {
    /// Reads up to `buf.len()` bytes from the current position.
    ///
    /// Returning fewer bytes than requested means end of file.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FileError>;

    /// Moves the read position to `offset` bytes from the start.
    fn seek(&mut self, offset: u32) -> Result<(), FileError>;

    fn close(self);
}
