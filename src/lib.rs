//! Pure Rust WOFF to OpenType converter
//!
//! Decompresses the tables of a [WOFF 1.0](https://www.w3.org/TR/WOFF/) font and writes them
//! back out as a plain sfnt (`.otf` or `.ttf`) font.
//!
//! ```no_run
//! let conversion = unwoff::convert("font.woff", "font.otf")?;
//! println!("wrote {} tables", conversion.tables.len());
//! # Ok::<(), unwoff::WoffError>(())
//! ```

// Round a value up to the nearest multiple of 4. Don't round the value in the
// case that rounding up overflows.
//
// Implemented as a macro to make it generic over the type without horrible type bounds
macro_rules! Round4 {
    ($value:expr) => {
        match $value.checked_add(3) {
            Some(value_plus_3) => value_plus_3 & !3,
            None => $value,
        }
    };
}
use Round4;

mod decompress_woff1;
pub mod error;
pub mod font_type;
pub mod header;
pub mod options;
pub mod sfnt;

#[cfg(feature = "z")]
pub use decompress_woff1::{convert, decompress_woff1};
pub use decompress_woff1::{Conversion, Converter, decompress_woff1_with_custom_z};
pub use error::{SizeContext, WoffError};
pub use font_type::{FontType, detect_type, font_type};
pub use options::{ChecksumPolicy, Options};
