// Household file I/O

pub mod error;
pub mod reader;
pub mod writer;

pub use error::IoError;
pub use reader::{read_rows, read_rows_from_str, ReadReport};
pub use writer::{write_households, write_households_to, OUTPUT_HEADERS};
