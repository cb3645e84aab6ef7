use core::fmt::{Display, Formatter};

/// Fatal: the engine stays disabled and every `play` becomes a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitError {
    MountFailed(FileError),
    NoTransferChannel,
    NoDeferredIrq,
}

impl Display for InitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            InitError::MountFailed(e) => write!(f, "failed to mount storage ({e})"),
            InitError::NoTransferChannel => write!(f, "failed to claim DMA channel"),
            InitError::NoDeferredIrq => write!(f, "failed to claim user interrupt"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileError {
    NotFound,
    NotMounted,
    Io,
}

impl Display for FileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            FileError::NotFound => write!(f, "no such file"),
            FileError::NotMounted => write!(f, "volume not mounted"),
            FileError::Io => write!(f, "I/O error"),
        }
    }
}

/// Why a sound file was rejected before playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatError {
    NotRiff,
    NotWave,
    NotPcm(u16),
    Channels(u16),
    BitsPerSample(u16),
    /// The header ends before a required field.
    Truncated,
    /// The header could not be read at all.
    Io(FileError),
}

impl Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            FormatError::NotRiff => write!(f, "not a valid RIFF (WAVE) file"),
            FormatError::NotWave => write!(f, "not a valid WAVE file"),
            FormatError::NotPcm(tag) => write!(f, "audio format {tag} is not PCM, only PCM is supported"),
            FormatError::Channels(n) => write!(f, "has {n} channels, only one is supported (mono)"),
            FormatError::BitsPerSample(n) => write!(f, "uses {n} bits per sample, only 16 is supported"),
            FormatError::Truncated => write!(f, "header is truncated"),
            FormatError::Io(e) => write!(f, "failed to read header ({e})"),
        }
    }
}

/// Why `play` ended up with no open session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionError {
    Open(FileError),
    Format(FormatError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            SessionError::Open(e) => write!(f, "failed to open ({e})"),
            SessionError::Format(e) => write!(f, "{e}"),
        }
    }
}

impl From<FormatError> for SessionError {
    fn from(e: FormatError) -> Self {
        SessionError::Format(e)
    }
}
