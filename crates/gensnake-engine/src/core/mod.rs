pub use self::{board_snapshot::*, cell::*, direction_queue::*};

pub(crate) mod board_snapshot;
pub(crate) mod cell;
pub(crate) mod direction_queue;
