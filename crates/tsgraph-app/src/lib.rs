//! # tsgraph-app
//!
//! Front-end demo host for tsgraph.
//!
//! ## Modules
//!
//! - `demo` - Demo waveform data
//! - `component` - Leptos `PlotCanvas` hosting a `WebScene` (wasm32)

pub mod demo;
#[cfg(target_arch = "wasm32")]
pub mod component;

#[cfg(target_arch = "wasm32")]
pub use component::*;
pub use demo::Waveform;

/// Install the tracing subscriber and, in the browser, the panic hook
pub fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    }
}
