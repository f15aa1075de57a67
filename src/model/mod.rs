pub mod task;
pub mod category;
pub mod record;
pub mod filter;
pub mod config;

pub use task::*;
pub use category::*;
pub use record::*;
pub use filter::*;
pub use config::*;
