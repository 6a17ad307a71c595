mod error;
pub mod hex;
mod model;
mod source;
mod types;


pub use error::*;
pub use model::*;
pub use source::BlockSource;
pub use types::*;
