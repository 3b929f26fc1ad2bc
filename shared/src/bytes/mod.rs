mod error;
mod reader;
mod writer;

pub use error::ReadError;
pub use reader::ByteReader;
pub use writer::ByteWriter;
