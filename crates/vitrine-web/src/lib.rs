#![forbid(unsafe_code)]

//! WASM front end for Vitrine.
//!
//! This crate binds the platform-independent behaviors in `vitrine-core` to a
//! live page:
//! - DOM adapters for the core's page traits,
//! - `localStorage`-backed preference storage,
//! - event wiring (resize observation, font readiness, visibility, keys),
//! - a console logger.
//!
//! The JS entry point is `boot(configJson?)`.

pub mod css;
pub mod logging;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod storage;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use storage::BrowserStorage;
#[cfg(target_arch = "wasm32")]
pub use wasm::boot;

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
pub fn boot(config_json: Option<String>) -> Result<(), String> {
    let config = match config_json.as_deref() {
        Some(json) => vitrine_core::PageConfig::from_json(json).map_err(|e| e.to_string())?,
        None => vitrine_core::PageConfig::default(),
    };
    logging::init(&config.log_level);
    Err("vitrine-web needs a browser (wasm32) to mount".into())
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn native_boot_rejects_bad_config_first() {
        let err = boot(Some("{ nope".into())).unwrap_err();
        assert!(err.starts_with("invalid config JSON"));
    }

    #[test]
    fn native_boot_reports_missing_browser() {
        let err = boot(None).unwrap_err();
        assert!(err.contains("wasm32"));
    }
}
