mod gate;
mod store;

pub use gate::{GateState, GateView, RevealGate};
pub use store::{RevealState, RevealStore, KEY_REGISTRATION_OPEN, KEY_SITE_REVEALED};
