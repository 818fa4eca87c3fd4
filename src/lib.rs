//! # hzip
//!
//! Single-file Huffman compressor. The original file extension travels
//! inside the compressed stream so `name.hzip` decompresses back to
//! `name.<ext>`.
//!
//! ```no_run
//! use hzip::{archive, Options};
//!
//! let report = archive::compress_file("notes.txt", &Options::default())?;
//! assert_eq!(report.dest.to_str(), Some("notes.hzip"));
//! archive::decompress_file("notes.hzip", &Options::default())?;
//! # Ok::<(), hzip::HzipError>(())
//! ```

pub mod archive;
pub mod bitpack;
pub mod codec;
pub mod codeword;
pub mod config;
pub mod container;
pub mod decoder;
pub mod error;
pub mod frequency;
pub mod logger;
pub mod path;
pub mod tree;

pub use codec::{compress_bytes, decompress_bytes};
pub use config::Options;
pub use error::{ErrorKind, HzipError};
pub use tree::HuffmanTree;
