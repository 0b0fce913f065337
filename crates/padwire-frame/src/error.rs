/// Errors that can occur while decoding a frame.
///
/// Encoding is total and never produces an error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    /// The buffer is shorter than a full frame.
    #[error("frame too short ({len} bytes, need {need})")]
    TooShort { len: usize, need: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
