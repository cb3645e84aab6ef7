//! In-memory volume and recording hardware for unit tests.

use std::boxed::Box;
use std::string::{String, ToString};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::vec::Vec;

use spin::Mutex;

use crate::config::{OutputConfig, AUDIO_BUFFER_SIZE, SAMPLE_RATE};
use crate::driver::{InterruptController, IrqSource, PlaybackDriver, Priority};
use crate::error::{FileError, InitError};
use crate::storage::{SoundFile, Storage};
use crate::wave::DATA_OFFSET;

/// Runs once, from inside the next data read of a [`MemFile`], standing in
/// for an interrupt that preempts the reader.
pub type ReadHook = Arc<Mutex<Option<Box<dyn FnMut() + Send>>>>;

#[derive(Clone)]
pub struct MemFile {
    data: Vec<u8>,
    pos: usize,
    failing_reads_from: Option<usize>,
    failing_seek_to: Option<u32>,
    hook: Option<ReadHook>,
}

impl MemFile {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            pos: 0,
            failing_reads_from: None,
            failing_seek_to: None,
            hook: None,
        }
    }

    /// Reads starting at or past `offset` fail with `FileError::Io`.
    pub fn failing_reads_from(mut self, offset: usize) -> Self {
        self.failing_reads_from = Some(offset);
        self
    }

    /// Seeking to exactly `offset` fails with `FileError::Io`.
    pub fn failing_seek_to(mut self, offset: u32) -> Self {
        self.failing_seek_to = Some(offset);
        self
    }

    /// Fires `hook` on the first read of sample data.
    pub fn with_read_hook(mut self, hook: ReadHook) -> Self {
        self.hook = Some(hook);
        self
    }
}

impl SoundFile for MemFile {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FileError> {
        if self.pos >= DATA_OFFSET as usize {
            let hook = self.hook.as_ref().and_then(|hook| hook.lock().take());
            if let Some(mut hook) = hook {
                hook();
            }
        }
        if self.failing_reads_from.is_some_and(|offset| self.pos >= offset) {
            return Err(FileError::Io);
        }

        let rest = self.data.get(self.pos..).unwrap_or_default();
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        Ok(n)
    }

    fn seek(&mut self, offset: u32) -> Result<(), FileError> {
        if self.failing_seek_to == Some(offset) {
            return Err(FileError::Io);
        }
        self.pos = offset as usize;
        Ok(())
    }

    fn close(self) {}
}

#[derive(Default)]
pub struct MemStorage {
    files: Vec<(String, MemFile)>,
    unmountable: bool,
}

impl MemStorage {
    pub fn unmountable() -> Self {
        Self { unmountable: true, ..Self::default() }
    }

    pub fn with(self, name: &str, data: Vec<u8>) -> Self {
        self.with_file(name, MemFile::new(data))
    }

    pub fn with_file(mut self, name: &str, file: MemFile) -> Self {
        self.files.push((name.to_string(), file));
        self
    }
}

impl Storage for MemStorage {
    type File = MemFile;

    fn mount(&mut self) -> Result<(), FileError> {
        if self.unmountable {
            return Err(FileError::NotMounted);
        }
        Ok(())
    }

    fn open(&mut self, name: &str) -> Result<MemFile, FileError> {
        self.files
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, file)| file.clone())
            .ok_or(FileError::NotFound)
    }
}

/// Canonical 44-byte header followed by little-endian samples.
pub struct WavBuilder {
    audio_format: u16,
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
    data: Vec<u8>,
    declared_size: Option<u32>,
}

impl WavBuilder {
    pub fn new() -> Self {
        Self {
            audio_format: 1,
            channels: 1,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            data: Vec::new(),
            declared_size: None,
        }
    }

    pub fn audio_format(mut self, tag: u16) -> Self {
        self.audio_format = tag;
        self
    }

    pub fn channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = rate;
        self
    }

    pub fn bits_per_sample(mut self, bits: u16) -> Self {
        self.bits_per_sample = bits;
        self
    }

    pub fn samples(mut self, samples: &[i16]) -> Self {
        self.data = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        self
    }

    /// Overrides the data size field, e.g. to claim more data than present.
    pub fn declared_size(mut self, size: u32) -> Self {
        self.declared_size = Some(size);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let data_size = self.declared_size.unwrap_or(self.data.len() as u32);
        let block_align = self.channels * self.bits_per_sample / 8;

        let mut out = Vec::with_capacity(44 + self.data.len());
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_size).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&self.audio_format.to_le_bytes());
        out.extend_from_slice(&self.channels.to_le_bytes());
        out.extend_from_slice(&self.sample_rate.to_le_bytes());
        out.extend_from_slice(&(self.sample_rate * block_align as u32).to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&self.bits_per_sample.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_size.to_le_bytes());
        out.extend_from_slice(&self.data);
        out
    }
}

/// Records every transfer it is asked to start, with a copy of the buffer as
/// the hardware would have seen it.
#[derive(Default)]
pub struct MockDriver {
    no_channel: bool,
    configured: usize,
    completion: AtomicBool,
    acknowledged: AtomicUsize,
    started: Mutex<Vec<(*const u16, Vec<u16>)>>,
}

// the recorded addresses are only compared, never dereferenced
unsafe impl Send for MockDriver {}
unsafe impl Sync for MockDriver {}

impl MockDriver {
    /// A driver that finds every transfer channel taken.
    pub fn without_channel() -> Self {
        Self { no_channel: true, ..Self::default() }
    }

    pub fn configured(&self) -> usize {
        self.configured
    }

    pub fn raise_completion(&self) {
        self.completion.store(true, Ordering::SeqCst);
    }

    pub fn completion_raised(&self) -> bool {
        self.completion.load(Ordering::SeqCst)
    }

    pub fn acknowledged(&self) -> usize {
        self.acknowledged.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.started.lock().len()
    }

    pub fn last_start(&self) -> *const u16 {
        self.started.lock().last().map_or(core::ptr::null(), |(ptr, _)| *ptr)
    }

    /// Contents of the buffer handed to the `n`th transfer.
    pub fn snapshot(&self, n: usize) -> Vec<u16> {
        self.started.lock()[n].1.clone()
    }
}

impl PlaybackDriver for MockDriver {
    fn configure(&mut self, _output: &OutputConfig) -> Result<(), InitError> {
        if self.no_channel {
            return Err(InitError::NoTransferChannel);
        }
        self.configured += 1;
        Ok(())
    }

    fn start(&self, buffer: *const u16) {
        // what the transfer engine would read, copied at the moment it starts
        let contents = unsafe { core::slice::from_raw_parts(buffer, AUDIO_BUFFER_SIZE) }.to_vec();
        self.started.lock().push((buffer, contents));
    }

    fn owns_completion(&self) -> bool {
        self.completion.load(Ordering::SeqCst)
    }

    fn acknowledge(&self) {
        self.completion.store(false, Ordering::SeqCst);
        self.acknowledged.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct MockInterrupts {
    no_irq: bool,
    enabled: Vec<(IrqSource, Priority)>,
    fill_pending: AtomicBool,
}

impl MockInterrupts {
    pub fn without_irq() -> Self {
        Self { no_irq: true, ..Self::default() }
    }

    pub fn enabled(&self) -> Vec<(IrqSource, Priority)> {
        self.enabled.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.fill_pending.load(Ordering::SeqCst)
    }
}

impl InterruptController for MockInterrupts {
    fn claim(&mut self) -> Result<(), InitError> {
        if self.no_irq {
            return Err(InitError::NoDeferredIrq);
        }
        Ok(())
    }

    fn enable(&mut self, source: IrqSource, priority: Priority) {
        self.enabled.push((source, priority));
    }

    fn set_pending(&self, source: IrqSource) {
        if source == IrqSource::FillPending {
            self.fill_pending.store(true, Ordering::SeqCst);
        }
    }

    fn clear_pending(&self, source: IrqSource) {
        if source == IrqSource::FillPending {
            self.fill_pending.store(false, Ordering::SeqCst);
        }
    }
}
