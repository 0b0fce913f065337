use crate::description::SdpType;

/// Errors that can occur while setting up or driving a channel backend.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The WebRTC stack rejected an operation.
    #[error("webrtc {context} failed: {source}")]
    WebRtc {
        context: &'static str,
        #[source]
        source: webrtc::Error,
    },

    /// The local description was not available after it was applied.
    #[error("local session description unavailable")]
    MissingLocalDescription,

    /// A session description of the wrong kind was supplied.
    #[error("unexpected session description type '{got}' (expected '{expected}')")]
    UnexpectedDescription { expected: SdpType, got: SdpType },

    /// An operation needs a channel that has not been created yet.
    #[error("channel not created")]
    NotCreated,

    /// The backend already created its channel.
    #[error("channel already created")]
    AlreadyCreated,
}

pub type Result<T> = std::result::Result<T, TransportError>;

impl TransportError {
    pub(crate) fn webrtc(context: &'static str) -> impl FnOnce(webrtc::Error) -> Self {
        move |source| Self::WebRtc { context, source }
    }
}
