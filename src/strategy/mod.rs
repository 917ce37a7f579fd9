pub mod adjust;
pub mod algorithm;
