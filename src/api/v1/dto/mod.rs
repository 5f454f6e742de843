pub mod authorize;
pub mod signatures;
