pub mod holding;
pub mod lot;
pub mod order;
pub mod portfolio;
pub mod quote;
pub mod settings;
pub mod summary;
pub mod transaction;
