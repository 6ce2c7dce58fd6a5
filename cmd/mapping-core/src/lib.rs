pub mod driver;
pub mod error;
pub mod state;
pub mod store;

pub use driver::*;
pub use error::*;
pub use state::*;
pub use store::*;
