pub mod optimizer;
pub mod quartic;
pub mod scope;
pub mod training;
pub mod types;
pub mod utils;

pub use optimizer::*;
pub use quartic::*;
pub use scope::*;
pub use training::*;
pub use types::*;
pub use utils::*;
