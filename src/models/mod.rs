mod mapping;
mod order;

pub use mapping::*;
pub use order::*;
