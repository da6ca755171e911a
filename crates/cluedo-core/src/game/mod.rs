pub mod deal;
pub mod events;
