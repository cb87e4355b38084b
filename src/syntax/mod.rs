mod cursor;
mod reader;
mod source;
pub mod error;

pub use cursor::{Cursor, SourcePos};
pub use error::Error;
pub use reader::Reader;
pub use source::Source;
