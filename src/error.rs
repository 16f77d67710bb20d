use std::error::Error;
use std::fmt;

/// Errors reported by the containers. Absent values (lookups past the end,
/// access into an empty container) are `None`, not errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContainerError {
    /// A stride of zero bytes was requested at creation.
    ZeroStride,
    /// A growth unit of zero items was requested at creation.
    ZeroGrowthUnit,
    /// An item of the wrong byte length was handed to a fixed stride vector.
    StrideMismatch {
        /// The vector's stride.
        expected: usize,
        /// The length of the item that was passed.
        got: usize,
    },
    /// An empty payload was handed to a record list; records carry at least
    /// one byte.
    EmptyPayload,
    /// A record payload longer than the 32 bit length prefix can express.
    PayloadTooLarge {
        /// The length of the payload that was passed.
        bytes: usize,
    },
    /// The underlying allocator refused the request.
    AllocFailed {
        /// Total region size that was requested.
        bytes: usize,
    },
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroStride => write!(f, "stride must be at least one byte"),
            Self::ZeroGrowthUnit => write!(f, "growth unit must be at least one item"),
            Self::StrideMismatch { expected, got } => {
                write!(f, "stride mismatch: expected {expected} bytes, got {got}")
            }
            Self::EmptyPayload => write!(f, "record payloads must be at least one byte"),
            Self::PayloadTooLarge { bytes } => {
                write!(f, "record payload of {bytes} bytes exceeds the u32 length prefix")
            }
            Self::AllocFailed { bytes } => {
                write!(f, "allocation of {bytes} bytes failed")
            }
        }
    }
}

impl Error for ContainerError {}
