/// Calculate the adler hash of the data presented
///
/// Used to confirm the trailer of zlib streams.
pub fn calc_adler_hash(data: &[u8]) -> u32
{
    use simd_adler32::Adler32;

    let mut hasher = Adler32::new();

    hasher.write(data);

    hasher.finish()
}

/// Calculate the IEEE CRC-32 hash of the data presented
///
/// Used to confirm the trailer of gzip streams, and the optional
/// 16 bit header checksum in gzip headers.
pub fn calc_crc_hash(data: &[u8]) -> u32
{
    let mut hasher = crc32fast::Hasher::new();

    hasher.update(data);

    hasher.finalize()
}

/// Step a bit-reversed codeword of `length` bits to the next canonical
/// codeword of the same length.
///
/// Decode tables are indexed by bit-reversed codewords so that bits coming
/// off the LSB-first reader can be used as a table index with no reversal at
/// decode time. The price is paid here instead: appending zeros to a
/// reversed codeword is a no-op, but incrementing it means finding the
/// highest-order zero bit within the low `length` bits, setting it, and
/// clearing everything above it.
///
/// Returns 0 when the codeword was already all ones, callers stop before
/// that happens.
pub(crate) fn bit_reversed_increment(codeword: usize, length: usize) -> usize
{
    let mut bit = 1_usize << (length - 1);

    while (codeword & bit) != 0
    {
        bit >>= 1;
    }

    if bit == 0
    {
        return 0;
    }

    (codeword & (bit - 1)) | bit
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn reversed_increment_walks_three_bit_code()
    {
        // canonical 000,100,010,110,001,101,011,111 in reversed order
        let mut codeword = 0;
        let expected = [0b100, 0b010, 0b110, 0b001, 0b101, 0b011, 0b111];

        for want in expected
        {
            codeword = bit_reversed_increment(codeword, 3);
            assert_eq!(codeword, want);
        }
    }

    #[test]
    fn reversed_increment_wraps_to_zero()
    {
        assert_eq!(bit_reversed_increment(0b1111, 4), 0);
    }

    #[test]
    fn adler_of_empty_is_one()
    {
        assert_eq!(calc_adler_hash(&[]), 1);
    }

    #[test]
    fn crc_of_known_value()
    {
        // standard check value for the IEEE polynomial
        assert_eq!(calc_crc_hash(b"123456789"), 0xCBF4_3926);
    }
}
