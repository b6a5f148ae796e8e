pub mod channel;
pub mod error;
pub mod header;

pub use channel::*;
pub use error::*;
pub use header::*;
