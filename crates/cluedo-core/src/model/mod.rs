pub mod card;
pub mod catalog;
pub mod category;
pub mod hand;
pub mod location;
pub mod suggestion;
