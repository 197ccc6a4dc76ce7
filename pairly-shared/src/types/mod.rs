pub mod health;
pub mod response;

pub use health::*;
pub use response::*;
