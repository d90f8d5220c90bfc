//! Lifecycle and authorization engine for design requests.
//!
//! Every operation takes an explicit [`Actor`] describing who is acting;
//! the engine never reads ambient state. The decision logic lives here,
//! the HTTP layer only calls these operations and reacts to the typed
//! result.

pub mod actor;
pub mod blob;
pub mod error;
pub mod lifecycle;
pub mod users;
pub mod views;

pub use actor::Actor;
pub use error::{EngineError, Result};
