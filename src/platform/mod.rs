//! Platform bindings
//!
//! The browser shell owns rendering, audio and DOM input; it talks to the
//! game through [`web::WebGame`].

#[cfg(target_arch = "wasm32")]
pub mod web;
