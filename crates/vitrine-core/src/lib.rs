#![forbid(unsafe_code)]

//! Core: platform-independent page enhancement logic.
//!
//! Every behavior here talks to the page through small collaborator traits
//! ([`fit::FitElement`], [`theme::ThemePage`], [`debug_overlay::DebugPage`],
//! [`width_sync::TimelinePage`]) and to persistence through
//! [`storage::KeyValueStore`]. The `vitrine-web` crate implements those traits
//! on top of the DOM; tests implement them with plain structs.

pub mod config;
pub mod debug_overlay;
pub mod fit;
pub mod frame;
pub mod storage;
pub mod theme;
pub mod trigger;
pub mod width_sync;

pub use config::{ConfigError, PageConfig};
pub use fit::{FitProfile, FitRange, TextFitter};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use theme::{ThemeController, ThemeMode};
pub use trigger::{Scheduler, Task, TriggerSource};
