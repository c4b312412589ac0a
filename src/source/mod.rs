pub mod clock;
pub mod offset;
pub mod reader;
pub mod rotation;
pub mod tailer;
pub mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use reader::{read_new, read_new_tail, ReadChunk, ReaderError};
pub use rotation::RotationResolver;
pub use tailer::{SourceTailer, TailError, TailOutcome};
pub use window::LineWindow;
