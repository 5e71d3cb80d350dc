/// Framing detected around a deflate payload.
///
/// Returned by the wrapper sniffing stage, the variant decides which
/// trailing checksum the decoder verifies once the block loop finishes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeflateFormat
{
    /// A bare deflate stream, no framing and no trailing checksum
    Raw,
    /// RFC 1950 framing, big endian Adler-32 trailer
    Zlib,
    /// RFC 1952 framing, little endian CRC-32 plus size trailer
    Gzip
}
