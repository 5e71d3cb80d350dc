//! A one shot deflate decoder with zlib and gzip framing support.
//!
//! The decoder consumes a whole compressed buffer and produces the whole
//! output, there is no streaming. Wrapper detection, block decoding and
//! trailer verification all live here; the bit level reader is in
//! [`bitstream`](crate::bitstream) and the packed symbol values in
//! [`constants`](crate::constants).

use std::cmp::min;

use log::trace;

use crate::bitstream::{BitStreamReader, MAX_OVERREAD_BYTES};
use crate::constants::{
    DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN, DEFLATE_BLOCKTYPE_STATIC, DEFLATE_BLOCKTYPE_UNCOMPRESSED,
    DEFLATE_MAX_CODEWORD_LENGTH, DEFLATE_NUM_LITLEN_SYMS, DEFLATE_NUM_OFFSET_SYMS,
    DEFLATE_NUM_PRECODE_SYMS, DEFLATE_PRECODE_LENS_PERMUTATION, HUFFDEC_DATA_SHIFT,
    HUFFDEC_EXTRA_MASK, HUFFDEC_INVALID_CODEWORD, HUFFDEC_LITERAL, HUFFDEC_SUBTABLE_POINTER,
    LITLEN_DECODE_RESULTS, LITLEN_ENOUGH, LITLEN_TABLE_BITS, OFFSET_DECODE_RESULTS, OFFSET_ENOUGH,
    OFFSET_TABLE_BITS, PRECODE_DECODE_RESULTS, PRECODE_ENOUGH, PRECODE_TABLE_BITS,
};
use crate::enums::DeflateFormat;
use crate::errors::{DecodeErrorStatus, InflateDecodeErrors};
use crate::utils::{bit_reversed_increment, calc_adler_hash, calc_crc_hash};

/// Codeword lengths a dynamic block can carry, literal/length then offset
const LENGTHS_ARRAY_SIZE: usize = DEFLATE_NUM_LITLEN_SYMS + DEFLATE_NUM_OFFSET_SYMS;

/// Cap on the speculative output reservation taken from the gzip ISIZE
/// field, the field is untrusted input and only ever treated as a hint.
const GZIP_RESERVE_CAP: usize = 1 << 27;

/// Options that can influence decompression
/// in Deflate/Zlib/Gzip
///
/// To use them, pass a customized options to
/// [`DeflateDecoder::new_with_options`].
#[derive(Debug, Copy, Clone)]
pub struct DeflateOptions
{
    limit:            usize,
    confirm_checksum: bool,
    size_hint:        usize
}

impl Default for DeflateOptions
{
    fn default() -> Self
    {
        DeflateOptions {
            limit:            usize::MAX,
            confirm_checksum: true,
            size_hint:        37000
        }
    }
}

impl DeflateOptions
{
    /// Get deflate/zlib limit option
    ///
    /// The decoder will not continue decoding once output size becomes
    /// greater than this
    pub const fn get_limit(&self) -> usize
    {
        self.limit
    }
    /// Set a limit to the internal vector
    /// used to store decoded zlib/deflate output.
    ///
    /// # Arguments
    /// limit: The maximum size of the output vector, in bytes
    #[must_use]
    pub fn set_limit(mut self, limit: usize) -> Self
    {
        self.limit = limit;
        self
    }

    /// Get whether the decoder will confirm a checksum
    /// after decoding
    pub const fn get_confirm_checksum(&self) -> bool
    {
        self.confirm_checksum
    }
    /// Set whether the decoder should confirm the trailing Adler-32 or
    /// CRC-32 after decoding.
    ///
    /// Skipping the confirmation is faster but accepts corrupt data.
    #[must_use]
    pub fn set_confirm_checksum(mut self, yes: bool) -> Self
    {
        self.confirm_checksum = yes;
        self
    }

    /// Get the default size hint for the decompressor
    ///
    /// The decompressor initializes the internal storage for decompressed
    /// bytes with this size.
    pub const fn get_size_hint(&self) -> usize
    {
        self.size_hint
    }
    /// Set the size hint for the decompressor
    ///
    /// A good hint avoids reallocations while the output grows. Gzip
    /// streams override this with the size recorded in their trailer.
    #[must_use]
    pub fn set_size_hint(mut self, hint: usize) -> Self
    {
        self.size_hint = hint;
        self
    }
}

/// A deflate decoder instance.
///
/// One instance decodes one buffer, either via [`decode`](Self::decode)
/// which sniffs the framing, or via the explicit
/// [`decode_gzip`](Self::decode_gzip), [`decode_zlib`](Self::decode_zlib)
/// and [`decode_deflate`](Self::decode_deflate) entry points.
///
/// The three Huffman decode tables are owned by the instance and rebuilt in
/// place at every block, so the hot path never allocates anything but
/// output.
pub struct DeflateDecoder<'a>
{
    data:                 &'a [u8],
    payload_start:        usize,
    payload_end:          usize,
    options:              DeflateOptions,
    format:               Option<DeflateFormat>,
    stream:               BitStreamReader<'a>,
    is_last_block:        bool,
    static_codes_loaded:  bool,
    precode_decode_table: [u32; PRECODE_ENOUGH],
    litlen_decode_table:  [u32; LITLEN_ENOUGH],
    offset_decode_table:  [u32; OFFSET_ENOUGH]
}

impl<'a> DeflateDecoder<'a>
{
    /// Create a new decoder over `data` with default options
    pub fn new(data: &'a [u8]) -> DeflateDecoder<'a>
    {
        DeflateDecoder::new_with_options(data, DeflateOptions::default())
    }

    /// Create a new decoder over `data` with custom options
    pub fn new_with_options(data: &'a [u8], options: DeflateOptions) -> DeflateDecoder<'a>
    {
        DeflateDecoder {
            data,
            payload_start: 0,
            payload_end: data.len(),
            options,
            format: None,
            stream: BitStreamReader::new(data),
            is_last_block: false,
            static_codes_loaded: false,
            precode_decode_table: [0; PRECODE_ENOUGH],
            litlen_decode_table: [0; LITLEN_ENOUGH],
            offset_decode_table: [0; OFFSET_ENOUGH]
        }
    }

    /// The framing chosen by the last decode call, if any.
    pub const fn format(&self) -> Option<DeflateFormat>
    {
        self.format
    }

    /// Decompress a buffer, detecting the framing automatically.
    ///
    /// Detection tries gzip, then zlib, and falls back to a raw deflate
    /// stream when neither signature is present. A recognized but
    /// malformed wrapper is an error, not a fallback.
    pub fn decode(&mut self) -> Result<Vec<u8>, InflateDecodeErrors>
    {
        self.payload_start = 0;
        self.payload_end = self.data.len();

        let mut format = self
            .skip_gzip_wrapper()
            .map_err(InflateDecodeErrors::new_with_error)?;

        if format == DeflateFormat::Raw
        {
            format = self
                .skip_zlib_wrapper()
                .map_err(InflateDecodeErrors::new_with_error)?;
        }

        self.decode_payload(format)
    }

    /// Decompress a gzip wrapped stream.
    ///
    /// Errors out if the gzip magic bytes are missing instead of falling
    /// back to another framing.
    pub fn decode_gzip(&mut self) -> Result<Vec<u8>, InflateDecodeErrors>
    {
        self.payload_start = 0;
        self.payload_end = self.data.len();

        match self.skip_gzip_wrapper()
        {
            Ok(DeflateFormat::Gzip) => self.decode_payload(DeflateFormat::Gzip),
            Ok(_) => Err(InflateDecodeErrors::new_with_error(
                DecodeErrorStatus::Generic("Not a gzip stream, magic bytes do not match")
            )),
            Err(e) => Err(InflateDecodeErrors::new_with_error(e))
        }
    }

    /// Decompress a zlib wrapped stream.
    ///
    /// Errors out if the two header bytes don't form a zlib header instead
    /// of falling back to raw deflate.
    pub fn decode_zlib(&mut self) -> Result<Vec<u8>, InflateDecodeErrors>
    {
        self.payload_start = 0;
        self.payload_end = self.data.len();

        match self.skip_zlib_wrapper()
        {
            Ok(DeflateFormat::Zlib) => self.decode_payload(DeflateFormat::Zlib),
            Ok(_) => Err(InflateDecodeErrors::new_with_error(
                DecodeErrorStatus::Generic("Not a zlib stream, header bytes do not match")
            )),
            Err(e) => Err(InflateDecodeErrors::new_with_error(e))
        }
    }

    /// Decompress a bare deflate stream with no framing and no checksum.
    pub fn decode_deflate(&mut self) -> Result<Vec<u8>, InflateDecodeErrors>
    {
        self.payload_start = 0;
        self.payload_end = self.data.len();

        self.decode_payload(DeflateFormat::Raw)
    }

    /// Run the block loop over the payload between `payload_start` and
    /// `payload_end` and verify the trailer `format` promises.
    fn decode_payload(&mut self, format: DeflateFormat) -> Result<Vec<u8>, InflateDecodeErrors>
    {
        self.format = Some(format);
        self.is_last_block = false;
        self.static_codes_loaded = false;
        self.stream = BitStreamReader::new(&self.data[self.payload_start..self.payload_end]);

        let mut reservation = min(self.options.size_hint, self.options.limit);

        if format == DeflateFormat::Gzip
        {
            // ISIZE, the uncompressed size mod 2^32, sits in the last four
            // trailer bytes. A hint only, never validated.
            let hint = u32::from_le_bytes(self.trailer_bytes(self.payload_end + 4)) as usize;

            trace!("gzip ISIZE hint: {hint} bytes");

            reservation = min(hint, min(self.options.limit, GZIP_RESERVE_CAP));
        }

        let mut out = Vec::with_capacity(reservation);

        if let Err(e) = self.decode_blocks(&mut out)
        {
            return Err(InflateDecodeErrors::new(e, out));
        }

        if self.options.confirm_checksum
        {
            if let Err(e) = self.confirm_checksum(format, &out)
            {
                return Err(InflateDecodeErrors::new(e, out));
            }
        }

        Ok(out)
    }

    /// Detect and skip a gzip wrapper, RFC 1952.
    ///
    /// Returns `Raw` when no gzip signature is present, an error when the
    /// signature is present but the header is malformed. On success the
    /// payload window is clipped so block decoding can never touch the
    /// eight trailer bytes.
    fn skip_gzip_wrapper(&mut self) -> Result<DeflateFormat, DecodeErrorStatus>
    {
        const HEADER_CRC_FLAG: u8 = 0x02;
        const EXTRA_INFO_FLAG: u8 = 0x04;
        const NAME_FLAG: u8 = 0x08;
        const COMMENT_FLAG: u8 = 0x10;
        // all of the above plus the text flag 0x01
        const KNOWN_FLAGS: u8 = 0x1F;

        let data = self.data;

        // Ten byte header, four byte checksum and the four byte size word,
        // even with no compressed data at all.
        if data.len() < 18
        {
            return Ok(DeflateFormat::Raw);
        }

        // id1, id2 and the compression method have fixed values
        if data[0] != 0x1F || data[1] != 0x8B || data[2] != 8
        {
            return Ok(DeflateFormat::Raw);
        }

        let flags = data[3];

        // rfc1952 reserves the high bits, reject them
        if (flags & !KNOWN_FLAGS) != 0
        {
            return Err(DecodeErrorStatus::Generic("ERR10: Unknown flags in gzip header"));
        }

        let end = data.len() - 8;
        let mut position = 10;

        if (flags & EXTRA_INFO_FLAG) != 0
        {
            if position + 2 > end
            {
                return Err(DecodeErrorStatus::InsufficientData);
            }
            let xlen = usize::from(u16::from_le_bytes([data[position], data[position + 1]]));

            position += 2 + xlen;

            if position > end
            {
                return Err(DecodeErrorStatus::InsufficientData);
            }
        }

        if (flags & NAME_FLAG) != 0
        {
            position = skip_cstring(data, position, end)?;
        }

        if (flags & COMMENT_FLAG) != 0
        {
            position = skip_cstring(data, position, end)?;
        }

        if (flags & HEADER_CRC_FLAG) != 0
        {
            if position + 2 > end
            {
                return Err(DecodeErrorStatus::InsufficientData);
            }
            // low half of a CRC-32 over everything consumed so far
            let computed = calc_crc_hash(&data[..position]);
            let expected = u16::from_le_bytes([data[position], data[position + 1]]);

            if expected != (computed & 0xFFFF) as u16
            {
                return Err(DecodeErrorStatus::Generic(
                    "ERR11: Incorrect checksum in gzip header"
                ));
            }
            position += 2;
        }

        trace!("Detected gzip wrapper, {position} byte header");

        self.payload_start = position;
        self.payload_end = end;

        Ok(DeflateFormat::Gzip)
    }

    /// Detect and skip a zlib wrapper, RFC 1950.
    ///
    /// Returns `Raw` when the first byte doesn't carry the deflate method
    /// nibble, an error when it does but the header fails validation.
    fn skip_zlib_wrapper(&mut self) -> Result<DeflateFormat, DecodeErrorStatus>
    {
        let data = self.data;

        // Two byte header and four byte checksum at minimum
        if data.len() < 6
        {
            return Ok(DeflateFormat::Raw);
        }

        let cmf = data[0];

        // Low nibble is the compression method, only deflate is defined.
        // Any other value means this isn't a zlib stream at all.
        if (cmf & 0x0F) != 8
        {
            return Ok(DeflateFormat::Raw);
        }

        let flg = data[1];

        // The two bytes, as a big endian 16 bit value, must divide by 31
        if (256 * u32::from(cmf) + u32::from(flg)) % 31 != 0
        {
            return Err(DecodeErrorStatus::Generic(
                "ERR12: Incorrect FCHECK value in zlib header"
            ));
        }

        // CINFO is the window size as a power of two above 256, above
        // 32 KB is not allowed
        if (cmf >> 4) > 7
        {
            return Err(DecodeErrorStatus::Generic(
                "ERR13: Incorrect CINFO value in zlib header"
            ));
        }

        if (flg & (1 << 5)) != 0
        {
            return Err(DecodeErrorStatus::Generic(
                "ERR14: A preset dictionary (FDICT flag in zlib header) not supported"
            ));
        }

        trace!("Detected zlib wrapper");

        self.payload_start = 2;
        self.payload_end = data.len() - 4;

        Ok(DeflateFormat::Zlib)
    }

    /// Four trailer bytes starting at `at`, for checksum and size words.
    fn trailer_bytes(&self, at: usize) -> [u8; 4]
    {
        let mut bytes = [0_u8; 4];

        bytes.copy_from_slice(&self.data[at..at + 4]);

        bytes
    }

    /// Compare the output against the checksum the wrapper recorded.
    fn confirm_checksum(&self, format: DeflateFormat, out: &[u8])
        -> Result<(), DecodeErrorStatus>
    {
        match format
        {
            DeflateFormat::Zlib =>
            {
                let expected = u32::from_be_bytes(self.trailer_bytes(self.payload_end));
                let computed = calc_adler_hash(out);

                if expected != computed
                {
                    return Err(DecodeErrorStatus::MismatchedAdler(expected, computed));
                }
            }
            DeflateFormat::Gzip =>
            {
                let expected = u32::from_le_bytes(self.trailer_bytes(self.payload_end));
                let computed = calc_crc_hash(out);

                if expected != computed
                {
                    return Err(DecodeErrorStatus::MismatchedCRC(expected, computed));
                }
            }
            DeflateFormat::Raw => {}
        }

        Ok(())
    }

    /// The block loop: read 3 bit block headers and dispatch until the
    /// final block is done.
    fn decode_blocks(&mut self, out: &mut Vec<u8>) -> Result<(), DecodeErrorStatus>
    {
        loop
        {
            self.is_last_block = self.stream.get_bits(1) == 1;
            let block_type = self.stream.get_bits(2);

            match block_type
            {
                DEFLATE_BLOCKTYPE_UNCOMPRESSED => self.process_uncompressed_block(out)?,
                DEFLATE_BLOCKTYPE_STATIC => self.process_static_huffman_block(out)?,
                DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN => self.process_dynamic_huffman_block(out)?,
                _ =>
                {
                    return Err(DecodeErrorStatus::Generic(
                        "Invalid block type, the reserved BTYPE 3"
                    ))
                }
            }

            if self.is_last_block
            {
                break;
            }
        }

        Ok(())
    }

    /// Copy a stored block verbatim into the output.
    fn process_uncompressed_block(&mut self, out: &mut Vec<u8>) -> Result<(), DecodeErrorStatus>
    {
        // LEN and NLEN sit at the next byte boundary
        self.stream.align_to_byte();

        if self.stream.remaining_bytes() < 4
        {
            return Err(DecodeErrorStatus::Generic(
                "ERR02: Not enough input for an uncompressed block"
            ));
        }

        let len = usize::from(self.stream.read_le_u16());
        let nlen = usize::from(self.stream.read_le_u16());

        if (nlen ^ 0xFFFF) != len
        {
            return Err(DecodeErrorStatus::Generic(
                "ERR03: Uncompressed block length mismatch"
            ));
        }

        if len > self.stream.remaining_bytes()
        {
            return Err(DecodeErrorStatus::Generic(
                "ERR04: Uncompressed block size more than input bytes available"
            ));
        }

        if out.len() + len > self.options.limit
        {
            return Err(DecodeErrorStatus::OutputLimitExceeded(
                self.options.limit,
                out.len() + len
            ));
        }

        let payload = &self.data[self.payload_start..self.payload_end];
        let start = self.stream.get_position();

        out.extend_from_slice(&payload[start..start + len]);
        self.stream.advance(len);

        Ok(())
    }

    /// Decode a block using the fixed RFC 1951 codes.
    fn process_static_huffman_block(&mut self, out: &mut Vec<u8>) -> Result<(), DecodeErrorStatus>
    {
        // The fixed tables survive until a dynamic block overwrites them,
        // so a run of static blocks builds them once.
        if !self.static_codes_loaded
        {
            let mut lens = [0_u8; LENGTHS_ARRAY_SIZE];

            lens[..144].fill(8);
            lens[144..256].fill(9);
            lens[256..280].fill(7);
            lens[280..288].fill(8);
            lens[288..].fill(5);

            self.build_litlen_and_offset_tables(
                &lens,
                DEFLATE_NUM_LITLEN_SYMS,
                DEFLATE_NUM_OFFSET_SYMS
            )?;

            self.static_codes_loaded = true;
        }

        self.decompress_huffman_block(out)
    }

    /// Read the code length preamble of a dynamic block, build all three
    /// tables and decode the block.
    fn process_dynamic_huffman_block(&mut self, out: &mut Vec<u8>) -> Result<(), DecodeErrorStatus>
    {
        let mut precode_lens = [0_u8; DEFLATE_NUM_PRECODE_SYMS];
        let mut lens = [0_u8; LENGTHS_ARRAY_SIZE];

        self.static_codes_loaded = false;

        let num_litlen_syms = 257 + self.stream.get_bits(5) as usize;
        let num_offset_syms = 1 + self.stream.get_bits(5) as usize;
        let num_explicit_precode_lens = 4 + self.stream.get_bits(4) as usize;

        trace!(
            "Dynamic block, {num_litlen_syms} literal/length codes, {num_offset_syms} offset codes"
        );

        // Codeword lengths for the code length alphabet arrive in a fixed
        // permutation, unsent entries stay zero.
        for i in DEFLATE_PRECODE_LENS_PERMUTATION
            .iter()
            .take(num_explicit_precode_lens)
        {
            let bits = self.stream.get_bits(3) as u8;

            precode_lens[usize::from(*i)] = bits;
        }

        build_decode_table(
            &mut self.precode_decode_table,
            PRECODE_TABLE_BITS,
            &precode_lens,
            &PRECODE_DECODE_RESULTS
        )?;

        // Decode the literal/length and offset codeword lengths with it
        let expected_count = num_litlen_syms + num_offset_syms;

        if expected_count > LENGTHS_ARRAY_SIZE
        {
            return Err(DecodeErrorStatus::Generic(
                "ERR05: Too many codeword lengths in a dynamic block"
            ));
        }

        let mut i = 0;

        while i < expected_count
        {
            let index = self.stream.peek_bits(PRECODE_TABLE_BITS as u8) as usize;
            let entry = self.precode_decode_table[index];

            if entry == HUFFDEC_INVALID_CODEWORD
            {
                return Err(DecodeErrorStatus::Generic(
                    "ERR01: Invalid codeword in input data"
                ));
            }

            self.stream.drop_bits((entry & HUFFDEC_EXTRA_MASK) as u8);

            let presym = entry >> HUFFDEC_DATA_SHIFT;

            // one explicit codeword length
            if presym < 16
            {
                lens[i] = presym as u8;
                i += 1;
                continue;
            }

            // run length encoded lengths
            let rep_val: u8;
            let rep_count: usize;

            match presym
            {
                16 =>
                {
                    // repeat the previous length 3 to 6 times
                    if i == 0
                    {
                        return Err(DecodeErrorStatus::Generic(
                            "ERR06: Repeat value without a value to repeat"
                        ));
                    }
                    rep_val = lens[i - 1];
                    rep_count = 3 + self.stream.get_bits(2) as usize;
                }
                17 =>
                {
                    // repeat zero 3 to 10 times
                    rep_val = 0;
                    rep_count = 3 + self.stream.get_bits(3) as usize;
                }
                18 =>
                {
                    // repeat zero 11 to 138 times
                    rep_val = 0;
                    rep_count = 11 + self.stream.get_bits(7) as usize;
                }
                _ =>
                {
                    return Err(DecodeErrorStatus::Generic("ERR07: Invalid repeat encoding"));
                }
            }

            if i + rep_count > expected_count
            {
                return Err(DecodeErrorStatus::Generic(
                    "ERR08: Repeat value too big for length table size"
                ));
            }

            lens[i..i + rep_count].fill(rep_val);
            i += rep_count;
        }

        self.build_litlen_and_offset_tables(&lens, num_litlen_syms, num_offset_syms)?;

        self.decompress_huffman_block(out)
    }

    /// Build the literal/length and offset tables from one combined
    /// lengths array.
    fn build_litlen_and_offset_tables(
        &mut self, lens: &[u8], num_litlen_syms: usize, num_offset_syms: usize
    ) -> Result<(), DecodeErrorStatus>
    {
        build_decode_table(
            &mut self.offset_decode_table,
            OFFSET_TABLE_BITS,
            &lens[num_litlen_syms..num_litlen_syms + num_offset_syms],
            &OFFSET_DECODE_RESULTS
        )?;

        build_decode_table(
            &mut self.litlen_decode_table,
            LITLEN_TABLE_BITS,
            &lens[..num_litlen_syms],
            &LITLEN_DECODE_RESULTS
        )?;

        Ok(())
    }

    /// Decode literals and matches until the end of block symbol.
    fn decompress_huffman_block(&mut self, out: &mut Vec<u8>) -> Result<(), DecodeErrorStatus>
    {
        loop
        {
            if out.len() > self.options.limit
            {
                return Err(DecodeErrorStatus::OutputLimitExceeded(
                    self.options.limit,
                    out.len()
                ));
            }

            // Zero fill past the end of input keeps the reader simple, but
            // a stream that leans on it this much has lost its end of
            // block marker.
            if self.stream.overread_count() > MAX_OVERREAD_BYTES
            {
                return Err(DecodeErrorStatus::Generic(
                    "Compressed stream ended before the final block was complete"
                ));
            }

            // literal/length symbol
            let index = self.stream.peek_bits(LITLEN_TABLE_BITS as u8) as usize;
            let mut entry = self.litlen_decode_table[index];

            if entry == HUFFDEC_INVALID_CODEWORD
            {
                return Err(DecodeErrorStatus::Generic(
                    "ERR01: Invalid codeword in input data"
                ));
            }

            let mut bit_count = (entry & HUFFDEC_EXTRA_MASK) as u8;

            if (entry & HUFFDEC_SUBTABLE_POINTER) != 0
            {
                // long codeword, the primary entry points at a subtable
                // indexed by the bits past the primary width
                self.stream.drop_bits(LITLEN_TABLE_BITS as u8);

                let index = (entry >> HUFFDEC_DATA_SHIFT) as usize
                    + self.stream.peek_bits(bit_count) as usize;

                entry = self.litlen_decode_table[index];

                if entry == HUFFDEC_INVALID_CODEWORD
                {
                    return Err(DecodeErrorStatus::Generic(
                        "ERR01: Invalid codeword in input data"
                    ));
                }

                bit_count = (entry & HUFFDEC_EXTRA_MASK) as u8;
            }

            self.stream.drop_bits(bit_count);

            if (entry & HUFFDEC_LITERAL) != 0
            {
                out.push((entry >> HUFFDEC_DATA_SHIFT) as u8);
                continue;
            }

            let entry = entry >> HUFFDEC_DATA_SHIFT;

            // symbol 256, end of block
            if entry == 0
            {
                return Ok(());
            }

            let mut length = (entry >> HUFFDEC_DATA_SHIFT) as usize;
            let extra = (entry & 0xFF) as u8;

            if extra != 0
            {
                length += self.stream.get_bits(extra) as usize;
            }

            // offset symbol, decoded the same two level way
            let index = self.stream.peek_bits(OFFSET_TABLE_BITS as u8) as usize;
            let mut entry = self.offset_decode_table[index];

            if entry == HUFFDEC_INVALID_CODEWORD
            {
                return Err(DecodeErrorStatus::Generic(
                    "ERR01: Invalid codeword in input data"
                ));
            }

            let mut bit_count = (entry & HUFFDEC_EXTRA_MASK) as u8;

            if (entry & HUFFDEC_SUBTABLE_POINTER) != 0
            {
                self.stream.drop_bits(OFFSET_TABLE_BITS as u8);

                let index = (entry >> HUFFDEC_DATA_SHIFT) as usize
                    + self.stream.peek_bits(bit_count) as usize;

                entry = self.offset_decode_table[index];

                if entry == HUFFDEC_INVALID_CODEWORD
                {
                    return Err(DecodeErrorStatus::Generic(
                        "ERR01: Invalid codeword in input data"
                    ));
                }

                bit_count = (entry & HUFFDEC_EXTRA_MASK) as u8;
            }

            self.stream.drop_bits(bit_count);

            let entry = entry >> HUFFDEC_DATA_SHIFT;
            let mut distance = (entry >> HUFFDEC_DATA_SHIFT) as usize;
            let extra = (entry & 0xFF) as u8;

            if extra != 0
            {
                distance += self.stream.get_bits(extra) as usize;
            }

            let size = out.len();

            // The back reference must land inside what we've produced
            if distance > size
            {
                return Err(DecodeErrorStatus::Generic(
                    "ERR09: Encoded distance not within buffer limits"
                ));
            }

            if size + length > self.options.limit
            {
                return Err(DecodeErrorStatus::OutputLimitExceeded(
                    self.options.limit,
                    size + length
                ));
            }

            if distance == 1
            {
                // one repeating byte, common enough to special case
                let byte = out[size - 1];

                out.resize(size + length, byte);
            }
            else if length <= distance
            {
                // source lies fully inside existing output
                out.extend_from_within(size - distance..size - distance + length);
            }
            else
            {
                // Length larger than distance replays the window forward
                // one byte at a time, each copied byte becomes source for
                // a later one. This is how deflate expresses runs.
                let mut position = size - distance;

                for _ in 0..length
                {
                    let byte = out[position];

                    out.push(byte);
                    position += 1;
                }
            }
        }
    }
}

/// Skip a NUL terminated field in a gzip header.
fn skip_cstring(data: &[u8], position: usize, end: usize) -> Result<usize, DecodeErrorStatus>
{
    match data[position..end].iter().position(|x| *x == 0)
    {
        Some(nul) => Ok(position + nul + 1),
        None => Err(DecodeErrorStatus::InsufficientData)
    }
}

/// Build a two level decode table from canonical codeword lengths.
///
/// `decode_table` gets a direct lookup table of `2^table_bits` entries,
/// followed by subtables for codewords longer than `table_bits`. Entries
/// are `symbol_values[sym] | bits_to_consume`; see
/// [`constants`](crate::constants) for the layout. The table is indexed by
/// bit-reversed codewords so decode can feed it LSB-first bits directly.
///
/// Lengths of zero mean the symbol is absent. An empty code is accepted
/// and produces an all-invalid table, a code with a single length-1 symbol
/// is accepted with codeword 0 left invalid, any other incomplete code and
/// every overfull code is rejected.
fn build_decode_table(
    decode_table: &mut [u32], table_bits: usize, codeword_lengths: &[u8], symbol_values: &[u32]
) -> Result<(), DecodeErrorStatus>
{
    let number_of_symbols = codeword_lengths.len();

    debug_assert!(number_of_symbols <= symbol_values.len());

    // number of codewords with each length, including length zero
    let mut length_counts = [0_u32; DEFLATE_MAX_CODEWORD_LENGTH + 1];

    for length in codeword_lengths
    {
        length_counts[usize::from(*length)] += 1;
    }

    let mut longest_codeword_length = DEFLATE_MAX_CODEWORD_LENGTH;

    while longest_codeword_length > 0 && length_counts[longest_codeword_length] == 0
    {
        longest_codeword_length -= 1;
    }

    // No symbols at all. Legal, a dynamic block need not contain any
    // matches, but any attempt to use a codeword will trip on the
    // sentinel.
    if longest_codeword_length == 0
    {
        decode_table[..1 << table_bits].fill(HUFFDEC_INVALID_CODEWORD);
        return Ok(());
    }

    // A codeword of length n covers 1/2^n of the codespace, sum that up
    // to classify the code as complete, incomplete or overfull.
    let mut codespace_used = 0_u32;

    for length in 1..=longest_codeword_length
    {
        codespace_used = 2 * codespace_used + length_counts[length];
    }

    let codespace_size = 1_u32 << longest_codeword_length;

    if codespace_used > codespace_size
    {
        return Err(DecodeErrorStatus::Generic("Overfull Huffman code"));
    }

    if codespace_used < codespace_size
    {
        // Accept the special case of one symbol with codeword length 1,
        // needed for blocks that can encode just a single distance or
        // literal. The RFC is unclear here; like zlib we let codeword 1
        // carry the symbol, and leave codeword 0 invalid.
        if longest_codeword_length == 1
        {
            let single_sym = codeword_lengths
                .iter()
                .position(|len| *len != 0)
                .unwrap_or(0);

            let entry = symbol_values[single_sym] | 1;
            let size = 1 << table_bits;

            for ix in (0..size).step_by(2)
            {
                decode_table[ix] = HUFFDEC_INVALID_CODEWORD;
                decode_table[ix + 1] = entry;
            }

            return Ok(());
        }

        return Err(DecodeErrorStatus::Generic("Incomplete Huffman code"));
    }

    // Sort symbols by codeword length, ties by symbol order, which is
    // exactly codeword order for a canonical code.
    let mut offsets = [0_u32; DEFLATE_MAX_CODEWORD_LENGTH + 1];

    offsets[0] = 0;
    offsets[1] = length_counts[0];

    for length in 1..longest_codeword_length
    {
        offsets[length + 1] = offsets[length] + length_counts[length];
    }

    let mut sorted_syms = [0_u16; DEFLATE_NUM_LITLEN_SYMS];

    for (sym, length) in codeword_lengths.iter().enumerate()
    {
        let bucket = usize::from(*length);

        sorted_syms[offsets[bucket] as usize] = sym as u16;
        offsets[bucket] += 1;
    }

    // skip past the absent symbols
    let mut sym_index = offsets[0] as usize;

    // shortest codeword length present
    let mut codeword_length = 1;

    while length_counts[codeword_length] == 0
    {
        codeword_length += 1;
    }

    let mut count = length_counts[codeword_length];
    let mut end_index = 1_usize << codeword_length;
    let mut codeword = 0_usize;

    // First, all the codewords that fit in the primary table. Instead of
    // strided stores, each codeword is written once into a table of
    // 2^codeword_length entries which doubles whenever the length grows,
    // copying the first half into the second.
    while codeword_length <= table_bits
    {
        let all_ones = end_index - 1;

        loop
        {
            decode_table[codeword] = symbol_values[usize::from(sorted_syms[sym_index])]
                | codeword_length as u32;

            sym_index += 1;

            // the last codeword of a complete code is all ones
            if codeword == all_ones
            {
                while codeword_length < table_bits
                {
                    decode_table.copy_within(0..end_index, end_index);

                    end_index <<= 1;
                    codeword_length += 1;
                }

                return Ok(());
            }

            codeword = bit_reversed_increment(codeword, codeword_length);
            count -= 1;

            if count == 0
            {
                break;
            }
        }

        // advance to the next length that has symbols, doubling as we go
        loop
        {
            codeword_length += 1;

            if codeword_length <= table_bits
            {
                decode_table.copy_within(0..end_index, end_index);

                end_index <<= 1;
            }

            count = length_counts[codeword_length];

            if count != 0
            {
                break;
            }
        }
    }

    // The rest need subtables hanging off the primary slots their low
    // `table_bits` bits select.
    end_index = 1 << table_bits;

    let prefix_mask = (1_usize << table_bits) - 1;
    let mut prefix = usize::MAX;
    let mut begin_index = 0;

    loop
    {
        let extra_bits = codeword_length - table_bits;

        // a new prefix starts a new subtable
        let next_prefix = codeword & prefix_mask;

        if next_prefix != prefix
        {
            prefix = next_prefix;
            begin_index = end_index;

            // The subtable needs 2^extra_bits entries, more if not enough
            // codewords of this length remain to fill it, in which case
            // longer codewords complete it. The restricted Kraft sum
            // below finds the width that exactly fits.
            let mut subtable_bits = extra_bits;
            let mut subtable_codespace = count;

            while subtable_codespace < (1 << subtable_bits)
            {
                subtable_bits += 1;

                if table_bits + subtable_bits > DEFLATE_MAX_CODEWORD_LENGTH
                {
                    return Err(DecodeErrorStatus::CorruptData);
                }

                subtable_codespace =
                    2 * subtable_codespace + length_counts[table_bits + subtable_bits];
            }

            end_index = begin_index + (1 << subtable_bits);

            // link from the primary table to the subtable
            decode_table[prefix] = ((begin_index as u32) << HUFFDEC_DATA_SHIFT)
                | HUFFDEC_SUBTABLE_POINTER
                | subtable_bits as u32;
        }

        // fill the subtable entries for the current codeword
        let entry =
            symbol_values[usize::from(sorted_syms[sym_index])] | extra_bits as u32;

        sym_index += 1;

        let stride = 1_usize << extra_bits;
        let mut ix = begin_index + (codeword >> table_bits);

        while ix < end_index
        {
            decode_table[ix] = entry;
            ix += stride;
        }

        if codeword == (1 << codeword_length) - 1
        {
            return Ok(());
        }

        codeword = bit_reversed_increment(codeword, codeword_length);
        count -= 1;

        while count == 0
        {
            // Completeness guarantees longer codewords exist whenever the
            // all ones exit hasn't fired, so this terminates.
            codeword_length += 1;
            count = length_counts[codeword_length];
        }
    }
}
