pub mod rate;
pub mod transformer;
