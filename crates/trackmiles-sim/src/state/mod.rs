//! Published results shared with readers outside the tick loop.

mod store;

pub use store::{AppState, DtgReport};
