pub use tokio;
pub use tokio::time::sleep;

pub use cancel::CancellationToken;
pub use range::Range;

mod cancel;
mod range;
pub mod task;
