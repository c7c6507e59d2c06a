pub mod events;
pub mod provider;
pub mod rotate;
pub mod set;
pub mod status;
pub mod toggle;
