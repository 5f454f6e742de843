pub mod cache;
pub mod replay;
pub mod scope;
pub mod signing;
