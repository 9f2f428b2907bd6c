pub mod intent;
pub mod text;

pub use intent::{Intent, IntentDetector};
pub use text::clean_text;
