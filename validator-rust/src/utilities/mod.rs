pub mod json;
pub mod privacy;
