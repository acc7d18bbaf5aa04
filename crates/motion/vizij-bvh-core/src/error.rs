//! Error types for BVH clips

/// Error type for loading, editing and evaluating BVH clips
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BvhError {
    /// A keyword or label that the grammar does not allow at this point
    #[error("Unexpected token '{token}' on line {line}")]
    UnexpectedToken { token: String, line: usize },

    /// A numeric field that could not be parsed
    #[error("Malformed {field} '{token}' on line {line}")]
    MalformedNumber {
        field: &'static str,
        token: String,
        line: usize,
    },

    /// The stream ended before the grammar was complete
    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    /// A frame line carried fewer values than the channel layout needs
    #[error("Frame {frame} has {found} values, expected {expected}")]
    ShortFrame {
        frame: usize,
        expected: usize,
        found: usize,
    },

    /// A joint declared a channel count its kind cannot have
    #[error("Joint '{joint}' declares {count} channels")]
    InvalidChannels { joint: String, count: usize },

    /// Rotation channel labels do not name a permutation of X, Y and Z
    #[error("Joint '{joint}' has invalid rotation order '{order}'")]
    InvalidRotationOrder { joint: String, order: String },

    /// Frame time must be a positive, finite number of seconds
    #[error("Invalid frame time: {frame_time}")]
    InvalidFrameTime { frame_time: f64 },

    /// A frame vector does not match the skeleton's channel layout
    #[error("Frame has {found} channels, expected {expected}")]
    FrameLength { expected: usize, found: usize },

    /// A frame index past the end of the motion buffer
    #[error("Frame {frame} is out of range ({num_frames} frames)")]
    FrameOutOfRange { frame: usize, num_frames: usize },

    /// Inverse extraction has no decomposition for this rotation order
    #[error("Rotation order '{order}' of joint '{joint}' cannot be extracted from a matrix")]
    UnsupportedRotationOrder { joint: String, order: String },

    /// No skeleton and motion are loaded, or the motion has no frames
    #[error("Clip is not ready: no skeleton or motion loaded")]
    NotReady,

    /// Invalid value
    #[error("Invalid value: {reason}")]
    InvalidValue { reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// IO error
    #[error("IO error: {reason}")]
    Io { reason: String },
}

/// Result alias for clip operations
pub type Result<T> = core::result::Result<T, BvhError>;

impl BvhError {
    /// Check if the clip is still usable after this error
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FrameLength { .. }
                | Self::FrameOutOfRange { .. }
                | Self::UnsupportedRotationOrder { .. }
                | Self::NotReady
                | Self::InvalidValue { .. }
                | Self::Io { .. }
        )
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnexpectedToken { .. }
            | Self::MalformedNumber { .. }
            | Self::UnexpectedEof { .. }
            | Self::ShortFrame { .. } => "parse",
            Self::InvalidChannels { .. }
            | Self::InvalidRotationOrder { .. }
            | Self::InvalidFrameTime { .. } => "skeleton",
            Self::FrameLength { .. } | Self::FrameOutOfRange { .. } => "motion",
            Self::UnsupportedRotationOrder { .. } => "kinematics",
            Self::NotReady => "usage",
            Self::InvalidValue { .. } => "validation",
            Self::Serialization { .. } => "serialization",
            Self::Io { .. } => "io",
        }
    }
}

impl From<std::io::Error> for BvhError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}

impl From<std::fmt::Error> for BvhError {
    fn from(err: std::fmt::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for BvhError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
