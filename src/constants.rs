//! Alphabet sizes, table geometry and the packed symbol values written
//! into decode table entries.

/// Number of symbols in the code length (precode) alphabet
pub const DEFLATE_NUM_PRECODE_SYMS: usize = 19;

/// Maximum number of symbols in the literal/length alphabet.
///
/// A given block might use fewer.
pub const DEFLATE_NUM_LITLEN_SYMS: usize = 288;

/// Maximum number of symbols in the offset (distance) alphabet
pub const DEFLATE_NUM_OFFSET_SYMS: usize = 32;

/// Maximum codeword length across all deflate codes
pub const DEFLATE_MAX_CODEWORD_LENGTH: usize = 15;

/// Valid block types in the 2 bit BTYPE field, BTYPE 3 is reserved
/// and invalid.
pub const DEFLATE_BLOCKTYPE_UNCOMPRESSED: u32 = 0;
pub const DEFLATE_BLOCKTYPE_STATIC: u32 = 1;
pub const DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN: u32 = 2;

/// Order which precode lengths are stored in a dynamic block header
pub static DEFLATE_PRECODE_LENS_PERMUTATION: [u8; DEFLATE_NUM_PRECODE_SYMS] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Primary table widths, in bits.
///
/// Codewords no longer than the width resolve in a single direct lookup,
/// longer ones chase one subtable link.
pub const PRECODE_TABLE_BITS: usize = 7;
pub const LITLEN_TABLE_BITS: usize = 10;
pub const OFFSET_TABLE_BITS: usize = 8;

/// Table sizes able to hold the primary table plus every subtable the
/// worst case code can demand, from zlib's `enough` program:
/// `enough 19 7 7`, `enough 288 10 15` and `enough 32 8 15`.
pub const PRECODE_ENOUGH: usize = 128;
pub const LITLEN_ENOUGH: usize = 1334;
pub const OFFSET_ENOUGH: usize = 402;

/*
 * Decode table entry layout, high to low:
 *
 *   bits 31..8   packed symbol value, or the subtable base index for links
 *   bit  7       entry links to a subtable
 *   bit  6       literal/length entry is a plain literal byte
 *   bits  5..0   codeword bits to consume for terminals,
 *                index width for subtable links
 *
 * Length and offset values pack a further (base, extra bit count) pair
 * into the payload so the decoded value is `base + read_bits(extra)`.
 */
pub const HUFFDEC_SUBTABLE_POINTER: u32 = 0x80;
pub const HUFFDEC_LITERAL: u32 = 0x40;
pub const HUFFDEC_EXTRA_MASK: u32 = 0x3F;
pub const HUFFDEC_DATA_SHIFT: u32 = 8;

/// Sentinel filling every table position no codeword maps to.
///
/// Compared as a whole word, the payload is zero and the low byte is all
/// ones, a combination no real entry can produce.
pub const HUFFDEC_INVALID_CODEWORD: u32 = 0xFF;

const fn pack(data: u32) -> u32
{
    data << HUFFDEC_DATA_SHIFT
}

const fn literal(data: u32) -> u32
{
    pack(data) | HUFFDEC_LITERAL
}

const fn pack2(base: u32, extra: u32) -> u32
{
    pack(pack(base) | extra)
}

/// Base values for length codes 257..=287, RFC 1951 §3.2.5.
///
/// Codes 286 and 287 never occur in a valid stream but still need
/// table entries.
const LENGTH_BASE: [u16; 31] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258, 258, 258,
];

const LENGTH_EXTRA_BITS: [u8; 31] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0, 0, 0,
];

/// Base values for offset codes 0..=31.
///
/// Codes 30 and 31 are reserved, their bases lie beyond the window so any
/// use fails the distance check naturally.
const OFFSET_BASE: [u32; 32] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577, 32769, 49153,
];

const OFFSET_EXTRA_BITS: [u8; 32] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13, 14, 14,
];

const fn make_precode_decode_results() -> [u32; DEFLATE_NUM_PRECODE_SYMS]
{
    let mut results = [0_u32; DEFLATE_NUM_PRECODE_SYMS];
    let mut sym = 0;

    while sym < DEFLATE_NUM_PRECODE_SYMS
    {
        results[sym] = pack(sym as u32);
        sym += 1;
    }

    results
}

const fn make_litlen_decode_results() -> [u32; DEFLATE_NUM_LITLEN_SYMS]
{
    let mut results = [0_u32; DEFLATE_NUM_LITLEN_SYMS];
    let mut sym = 0;

    while sym < 256
    {
        results[sym] = literal(sym as u32);
        sym += 1;
    }

    // end of block marker, the only symbol whose payload is a bare zero
    results[256] = pack(0);

    let mut i = 0;

    while i < LENGTH_BASE.len()
    {
        results[257 + i] = pack2(LENGTH_BASE[i] as u32, LENGTH_EXTRA_BITS[i] as u32);
        i += 1;
    }

    results
}

const fn make_offset_decode_results() -> [u32; DEFLATE_NUM_OFFSET_SYMS]
{
    let mut results = [0_u32; DEFLATE_NUM_OFFSET_SYMS];
    let mut sym = 0;

    while sym < DEFLATE_NUM_OFFSET_SYMS
    {
        results[sym] = pack2(OFFSET_BASE[sym], OFFSET_EXTRA_BITS[sym] as u32);
        sym += 1;
    }

    results
}

/// Packed symbol values for the code length alphabet
pub static PRECODE_DECODE_RESULTS: [u32; DEFLATE_NUM_PRECODE_SYMS] = make_precode_decode_results();

/// Packed symbol values for the literal/length alphabet
pub static LITLEN_DECODE_RESULTS: [u32; DEFLATE_NUM_LITLEN_SYMS] = make_litlen_decode_results();

/// Packed symbol values for the offset alphabet
pub static OFFSET_DECODE_RESULTS: [u32; DEFLATE_NUM_OFFSET_SYMS] = make_offset_decode_results();
