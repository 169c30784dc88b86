pub mod alert;
pub mod asset;
pub mod vulnerability;
