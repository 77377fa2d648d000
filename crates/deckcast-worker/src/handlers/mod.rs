//! Stage handlers, one per job type.

mod assemble;
mod extract;
mod narrate;

pub use assemble::assemble_video;
pub use extract::extract_structure;
pub use narrate::synthesize_narration;
