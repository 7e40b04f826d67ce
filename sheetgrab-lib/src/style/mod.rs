pub mod lightning;
pub mod rule;
pub mod sheet;
