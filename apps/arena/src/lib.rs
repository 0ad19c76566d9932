//! # Arena
//!
//! A small demonstration of the herald event bus: players walk across an
//! arena, a border guard vetoes moves that leave it, and a chat listener
//! hears messages until it unsubscribes.
//!
//! ## Example
//! ```rust
//! use herald_arena::{Arena, ArenaConfig};
//!
//! # fn main() -> Result<(), herald_arena::ArenaError> {
//! let report = Arena::new(&ArenaConfig::default())?.run()?;
//! assert_eq!(report.late_chat_handlers, 0);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod game;
mod logging;

pub use crate::config::{ArenaConfig, BorderConfig, LoggingConfig, MovementConfig, load_config};
pub use crate::error::{ArenaError, ArenaErrorExt};
pub use crate::game::{
    Arena, ArenaReport, BorderGuard, ChatLog, Player, PlayerChatEvent, PlayerId, PlayerMoveEvent,
    Position, set_position_with_event,
};
pub use crate::logging::{Logging, init_logging};
