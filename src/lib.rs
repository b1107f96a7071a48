//! Reader for AFP (Advanced Function Presentation) print files.
//!
//! AFP files are a sequence of length-prefixed structured fields carrying
//! document, page, resource and text data, with EBCDIC text and big-endian
//! binary numbers.  This crate decodes that stream into ordered,
//! introspectable [`Record`]s; it does not render documents or validate
//! the relationships between fields.
//!
//! Entry points are [`stream`] (lazy) and [`load`] (eager):
//!
//! ```no_run
//! use afpread::ParserConfig;
//!
//! let f = std::fs::File::open("myfile.afp").unwrap();
//! for sf in afpread::stream(f, ParserConfig::default()) {
//!     let sf = sf.unwrap();
//!     println!("{:?}", sf.num("SFTypeID"));
//! }
//! ```

// Positioned reads from the input stream (one layer under the parser).
mod source;
// Positioned reads within a structured field's body.
mod buffer;

pub mod ebcdic;
pub mod error;
pub mod fields;
pub mod functions;
pub mod record;
pub mod syntax;
pub mod triplets;

pub mod parser;

pub use error::{ErrorKind, ParseError};
pub use parser::{load, stream, ParserConfig, Stream};
pub use record::{Record, Value};
