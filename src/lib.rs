//! A spiffy little inflate library.
//!
//! This crate decodes DEFLATE compressed data (RFC 1951) together with the
//! two wrapper formats that usually frame it, zlib (RFC 1950) and
//! gzip (RFC 1952), from a single in-memory buffer.
//!
//! Use it if
//! - You have the whole compressed buffer up front and want the whole
//!   output back, there is no streaming API here.
//! - You want a 100% safe, pure rust implementation.
//! - You want wrapper auto-detection and checksum verification handled
//!   for you.
//!
//! # Usage
//!
//! Decoding data whose framing you don't know in advance
//!
//! ```no_run
//! use undeflate::DeflateDecoder;
//! let totally_valid_data = [0; 23];
//! let mut decoder = DeflateDecoder::new(&totally_valid_data);
//!
//! let decompressed = decoder.decode();
//! ```
//!
//! Decoding zlib data without confirming the adler32 checksum
//!
//! ```no_run
//! use undeflate::{DeflateDecoder, DeflateOptions};
//! let totally_valid_data = [0; 23];
//! let options = DeflateOptions::default().set_confirm_checksum(false);
//! let mut decoder = DeflateDecoder::new_with_options(&totally_valid_data, options);
//!
//! let decompressed = decoder.decode_zlib();
//! ```
//!
//! Limiting how much output an untrusted buffer may expand into
//!
//! ```no_run
//! use undeflate::{DeflateDecoder, DeflateOptions};
//! let untrusted_data = [0; 23];
//! let options = DeflateOptions::default().set_limit(1 << 20);
//! let mut decoder = DeflateDecoder::new_with_options(&untrusted_data, options);
//!
//! let decompressed = decoder.decode();
//! ```
pub use crate::decoder::{DeflateDecoder, DeflateOptions};
pub use crate::enums::DeflateFormat;

mod bitstream;
mod constants;
mod decoder;
mod enums;
pub mod errors;
mod utils;
