mod crdt_message;
mod message_type;
mod reader;
mod writer;

pub use crdt_message::{CrdtMessage, HEADER_BYTES};
pub use message_type::MessageType;
pub use reader::{MessageReader, RawMessageIter};
pub use writer::{write_message, write_messages};
