//! Document model, date normalization, line numbering and errors.
//!
//! The types here are shared by both dialect codecs; a parsed Excel
//! workbook and a parsed Lingo file produce the same [`Order`] values.

mod builder;
pub mod dates;
mod error;
mod numbering;
mod types;
mod validation;

pub use builder::*;
pub use dates::{Coerced, DateNormalizer, parse_date, to_lingo_display};
pub use error::*;
pub use numbering::*;
pub use types::*;
pub use validation::*;
