pub mod ranker;
pub mod resolver;
pub mod session;
