//! Decompression error types.
//!
//! Errors carry a stable diagnostic. Failures with a numbered `ERR01`-`ERR15`
//! message keep the same wording from release to release so callers and test
//! harnesses can key on them.

use std::fmt::{Debug, Formatter};

/// A struct returned when decompression fails
pub struct InflateDecodeErrors
{
    /// reason why decompression fails
    pub error: DecodeErrorStatus,
    /// Decoded data up until that decompression error
    ///
    /// Callers should treat this as undefined, it is exposed for
    /// diagnostics only.
    pub data:  Vec<u8>
}

impl InflateDecodeErrors
{
    /// Create a new decode wrapper with data being
    /// how many bytes we actually decoded before hitting an error
    pub fn new(error: DecodeErrorStatus, data: Vec<u8>) -> InflateDecodeErrors
    {
        InflateDecodeErrors { error, data }
    }
    /// Create a new decode wrapper with an empty vector
    pub fn new_with_error(error: DecodeErrorStatus) -> InflateDecodeErrors
    {
        InflateDecodeErrors::new(error, vec![])
    }
    /// Return true if the input decoded fully but its trailing checksum
    /// did not match the output.
    ///
    /// Every other error means the input itself was malformed.
    pub fn is_checksum_mismatch(&self) -> bool
    {
        matches!(
            self.error,
            DecodeErrorStatus::MismatchedCRC(_, _) | DecodeErrorStatus::MismatchedAdler(_, _)
        )
    }
}

impl Debug for InflateDecodeErrors
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        writeln!(f, "{:?}", self.error)
    }
}

pub enum DecodeErrorStatus
{
    /// The input ran out before the structure being parsed was complete
    InsufficientData,
    /// A failure with a static diagnostic, this is the common case and
    /// includes every numbered `ERRxx` message
    Generic(&'static str),
    /// A failure whose diagnostic needed runtime formatting
    GenericStr(String),
    /// Input data was malformed in a way that has no better diagnostic
    CorruptData,
    /// Decompressed output grew past the limit configured in
    /// [`DeflateOptions`](crate::DeflateOptions)
    ///
    /// Arguments are the configured limit and the size the output would
    /// have reached.
    OutputLimitExceeded(usize, usize),
    /// Stored CRC-32 does not match the CRC-32 of the output.
    ///
    /// Only present for gzip streams.
    ///
    /// Arguments are the expected and the computed value.
    MismatchedCRC(u32, u32),
    /// Stored Adler-32 does not match the Adler-32 of the output.
    ///
    /// Only present for zlib streams.
    ///
    /// Arguments are the expected and the computed value.
    MismatchedAdler(u32, u32)
}

impl Debug for DecodeErrorStatus
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            Self::InsufficientData => writeln!(f, "Insufficient data"),
            Self::Generic(reason) => writeln!(f, "{reason}"),
            Self::GenericStr(reason) => writeln!(f, "{reason}"),
            Self::CorruptData => writeln!(f, "Corrupt data"),
            Self::OutputLimitExceeded(limit, current) => writeln!(
                f,
                "Output limit exceeded, set limit was {limit} and output size is {current}"
            ),
            Self::MismatchedCRC(expected, found) =>
            {
                writeln!(
                    f,
                    "ERR15: Data checksum mismatch, expected CRC-32 {expected:08x} but computed {found:08x}"
                )
            }
            Self::MismatchedAdler(expected, found) =>
            {
                writeln!(
                    f,
                    "ERR15: Data checksum mismatch, expected Adler-32 {expected:08x} but computed {found:08x}"
                )
            }
        }
    }
}
