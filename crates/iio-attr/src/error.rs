use reg_transport::TransportError;
use thiserror::Error;

pub type Result<T, E = AttrError> = core::result::Result<T, E>;

/// Errno values used on the wire for failed attributes.
mod errno {
    pub const EPERM: i32 = 1;
    pub const ENOENT: i32 = 2;
    pub const EIO: i32 = 5;
    pub const EACCES: i32 = 13;
    pub const EEXIST: i32 = 17;
    pub const EINVAL: i32 = 22;
    pub const ENOSYS: i32 = 38;
    pub const EBADMSG: i32 = 74;
    pub const ENOBUFS: i32 = 105;
}

#[derive(Debug, Error)]
pub enum AttrError {
    #[error("attribute not found: {0}")]
    AttributeNotFound(String),
    #[error("channel not found: {0}")]
    ChannelNotFound(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("value not supported: {0}")]
    ValueNotSupported(String),
    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),
    #[error("attribute is not readable: {0}")]
    NotReadable(String),
    #[error("attribute is not writable: {0}")]
    NotWritable(String),
    #[error("duplicate name in table: {0}")]
    DuplicateAttribute(String),
    #[error("malformed bulk stream: {0}")]
    MalformedStream(&'static str),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl AttrError {
    /// Negative errno-style code reported to clients for this failure.
    ///
    /// `ValueNotSupported` maps to the generic failure code (-1), distinct from
    /// bad syntax (-EINVAL).
    pub fn code(&self) -> i32 {
        let e = match self {
            AttrError::AttributeNotFound(_) | AttrError::ChannelNotFound(_) => errno::ENOENT,
            AttrError::InvalidArgument(_) => errno::EINVAL,
            AttrError::ValueNotSupported(_) => errno::EPERM,
            AttrError::BufferTooSmall { .. } => errno::ENOBUFS,
            AttrError::Unsupported(_) => errno::ENOSYS,
            AttrError::NotReadable(_) | AttrError::NotWritable(_) => errno::EACCES,
            AttrError::DuplicateAttribute(_) => errno::EEXIST,
            AttrError::MalformedStream(_) => errno::EBADMSG,
            AttrError::Transport(_) => errno::EIO,
        };
        -e
    }
}
