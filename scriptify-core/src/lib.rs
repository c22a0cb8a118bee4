pub mod demo;
pub mod error;
pub mod error_recovery;
pub mod error_utils;
pub mod funnel;
pub mod payload;
pub mod types;

pub use demo::*;
pub use error::*;
pub use error_recovery::*;
pub use error_utils::*;
pub use funnel::*;
pub use payload::*;
pub use types::*;
