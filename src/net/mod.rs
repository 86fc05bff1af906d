mod error;
mod listener;
mod registry;
mod router;
mod update;

pub use listener::{BindError, Listener};
pub use registry::Registry;
pub use router::{Router, DEFAULT_BASE};
