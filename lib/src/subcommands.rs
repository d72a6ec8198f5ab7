pub use fit::*;
pub use generate::*;

pub mod fit;
pub mod generate;
