pub mod events;
pub mod id;
pub mod model;

pub use events::{ClientMessage, ServerMessage};
pub use id::PrefixedId;
pub use model::{Comment, Recipe};
