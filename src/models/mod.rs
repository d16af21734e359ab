pub mod advisory;
pub mod evaluation;
pub mod hour;
pub mod preferences;
pub mod presets;
pub mod thresholds;
pub mod trend;
pub mod window;

pub use advisory::*;
pub use evaluation::*;
pub use hour::*;
pub use preferences::*;
pub use presets::*;
pub use thresholds::*;
pub use trend::*;
pub use window::*;
