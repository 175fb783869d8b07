pub mod byteorder;
mod cancel;
mod decode;
pub mod encoding;
mod heap;
mod rows;
mod table;

pub use cancel::{DecodeCoordinator, DecodeTicket};
pub use decode::{DecodeContext, NULL_ROW, decode_column, decode_field};
pub use heap::{Heap, HeapRef};
pub use rows::{Row, materialize};
pub use table::TableView;
