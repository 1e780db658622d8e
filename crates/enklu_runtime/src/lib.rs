//! Enklu Player Runtime
//!
//! Wires the player subsystems together and drives them from the host's
//! frame loop:
//!
//! - **Config**: TOML player configuration
//! - **Logging**: tracing subscriber setup
//! - **Player**: owns the element graph, controller groups, anchors and the
//!   proximity checker, and ticks them in a fixed order
//!
//! # Example
//!
//! ```rust,ignore
//! use enklu_runtime::{init_tracing, Player, PlayerConfig};
//!
//! let config = PlayerConfig::load(Path::new("enklu.toml"))?;
//! init_tracing(&config.log.filter);
//!
//! let mut player = Player::new(config, provider, http);
//! loop {
//!     player.tick();
//!     for (anchor, notification) in player.take_anchor_notifications() {
//!         // forward to the host
//!     }
//! }
//! ```

pub mod config;
pub mod logging;
pub mod player;

pub use config::{AnchorsConfig, LogConfig, PlayerConfig, TrellisConfig};
pub use logging::init_tracing;
pub use player::{AnchorHandle, Player, PlayerStats};

