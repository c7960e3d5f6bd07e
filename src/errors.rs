// SPDX-License-Identifier: MPL-2.0

//! Error types for the photobooth

use crate::backends::camera::BackendError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Camera-related errors
    #[error("Camera error: {0}")]
    Camera(#[from] BackendError),
    /// Strip composition errors
    #[error("Composition error: {0}")]
    Composition(#[from] CompositionError),
    /// Download or email delivery errors
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),
    /// Mail relay errors
    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
    /// Unusable command line input (missing or unreadable files)
    #[error("{0}")]
    InvalidInput(String),
    /// Filesystem and terminal I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Photo capture errors
#[derive(Debug, thiserror::Error)]
pub enum PhotoError {
    /// Frame buffer does not match its declared size
    #[error("Frame data is {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    InvalidFrame {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    /// Encoding failed
    #[error("Encoding failed: {0}")]
    Encoding(#[from] image::ImageError),
}

/// Strip composition errors
///
/// The native counterpart of an unreadable canvas: the template or one of the
/// shots cannot be decoded, or the finished strip cannot be encoded.
#[derive(Debug, thiserror::Error)]
pub enum CompositionError {
    /// Template artwork missing or undecodable
    #[error("Template unavailable: {0}")]
    Template(String),
    /// A stored shot could not be decoded
    #[error("Shot {slot} could not be decoded: {source}")]
    ShotDecode {
        slot: usize,
        #[source]
        source: image::ImageError,
    },
    /// More shots than the layout has slots
    #[error("Layout has {slots} slots but {shots} shots were given")]
    TooManyShots { slots: usize, shots: usize },
    /// Encoding the finished strip failed
    #[error("Strip encoding failed: {0}")]
    Encoding(#[source] image::ImageError),
}

/// Delivery errors (download and email)
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The strip could not be produced
    #[error(transparent)]
    Composition(#[from] CompositionError),
    /// Writing the strip to disk failed
    #[error("Failed to save strip: {0}")]
    Io(#[from] std::io::Error),
    /// The relay could not be reached
    #[error("Relay request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The relay answered with a non-success status
    #[error("Relay rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    /// Background task panicked or was cancelled
    #[error("Delivery task failed: {0}")]
    Task(String),
}

impl DeliveryError {
    /// Whether another attempt could succeed (network trouble or a relay-side failure)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Mail relay errors
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Image payload is not a valid data URI or base64 string
    #[error("Invalid image payload: {0}")]
    InvalidImage(String),
    /// SMTP settings missing at send time
    #[error("SMTP configuration incomplete: {0}")]
    Config(String),
    /// A recipient or sender address failed to parse
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    /// Message could not be assembled
    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    /// SMTP connection or delivery failure
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    /// Listener or socket failure
    #[error("Relay I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Booth actions refused in the current session state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No camera was acquired, capture is inert
    #[error("Camera unavailable")]
    CameraUnavailable,
    /// A countdown is already running
    #[error("Capture already in progress")]
    CaptureInProgress,
    /// Action only available while reviewing
    #[error("Only available while reviewing shots")]
    NotInReview,
    /// Action only available while retaking a shot
    #[error("No shot is being retaken")]
    NotRetaking,
    /// Slot index outside the strip
    #[error("Invalid shot slot {0}")]
    InvalidSlot(usize),
    /// Email field is empty
    #[error("Enter an email address first")]
    EmptyEmail,
    /// A send is already in flight
    #[error("Email is already being sent")]
    SendInFlight,
    /// A download is already being written
    #[error("Strip is already being saved")]
    DownloadInFlight,
    /// The strip was already sent this session
    #[error("Strip already sent")]
    AlreadySent,
}
