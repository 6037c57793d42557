//! Error types for mtdparts parsing and lookup

use thiserror::Error;

/// Errors raised by the partition store while a specification is applied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A partition was started on a device already closed by a
    /// remaining-space partition
    #[error("failed to add new partition: '{device}' device full")]
    DeviceFull {
        /// Tag of the device that can take no further partitions
        device: String,
    },

    /// An explicit offset landed inside space already allocated to earlier
    /// partitions of the device
    #[error(
        "failed to set '{device}' device partition start offset to {offset:#x}: \
         overlaps with registered areas below {busy:#x}"
    )]
    Overlap {
        /// Tag of the device the partition was being added to
        device: String,
        /// The rejected offset
        offset: u64,
        /// Busy extent of the device at the time of the attempt
        busy: u64,
    },
}

/// Errors raised while decomposing an mtdparts specification string
///
/// Each variant carries the offending device tag (when one is known) and
/// the offending raw text, so diagnostics pinpoint the input that failed.
/// The parse aborts at the first error; the table being built must then be
/// discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The overall specification string was empty
    #[error("empty specification")]
    EmptyInput,

    /// A partition definition did not start with a size field
    #[error("device '{device}': missing size specification: '{text}'")]
    MissingSize {
        /// Tag of the device being populated
        device: String,
        /// The partition definition at fault
        text: String,
    },

    /// The size field was not `-` or a valid integer literal with an
    /// optional `k`/`m`/`g` multiplier
    #[error("device '{device}': invalid size specification: '{text}'")]
    InvalidSize {
        /// Tag of the device being populated
        device: String,
        /// The partition definition at fault
        text: String,
    },

    /// The offset field following `@` was empty or not a valid integer
    /// literal
    #[error("device '{device}': invalid offset specification: '{text}'")]
    InvalidOffset {
        /// Tag of the device being populated
        device: String,
        /// The partition definition at fault
        text: String,
    },

    /// A name field held no characters between its parentheses
    #[error("device '{device}': empty name specification: '{text}'")]
    EmptyName {
        /// Tag of the device being populated
        device: String,
        /// The partition definition at fault
        text: String,
    },

    /// A name field was opened with `(` but never closed
    #[error("device '{device}': unterminated name specification: '{text}'")]
    UnterminatedName {
        /// Tag of the device being populated
        device: String,
        /// The partition definition at fault
        text: String,
    },

    /// Characters remained after the last recognized field of a partition
    /// definition
    #[error("device '{device}': excess elements in partition definition: '{text}'")]
    ExcessFields {
        /// Tag of the device being populated
        device: String,
        /// The leftover text
        text: String,
    },

    /// A device definition started with `:` before any device tag
    #[error("empty device ID specification: '{text}'")]
    EmptyDeviceId {
        /// The device definition at fault
        text: String,
    },

    /// A device definition named a device but listed no partitions
    #[error("device '{device}': empty partition list specification")]
    EmptyPartitionList {
        /// Tag (or full definition text, when no `:` was present) of the
        /// device at fault
        device: String,
    },

    /// A semantic violation reported by the partition store
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised when querying the finished table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// No partition carries the requested name
    #[error("'{0}' partition not found")]
    PartitionNotFound(String),
}

/// Result type alias for specification parsing
pub type Result<T> = std::result::Result<T, ParseError>;
