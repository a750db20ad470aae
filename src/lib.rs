// Library root
// -----------
// This crate exposes a small library surface for the CLI. The binary
// (`main.rs`) uses these modules to implement the interactive client.
//
// Module responsibilities:
// - `config`: startup configuration (server address, credentials, bulk
//   pacing) from config.toml plus environment overrides.
// - `error`: the typed failure surface shared by client and refresher.
// - `api`: the JSON-RPC operations against Kodi's video library, behind
//   the `LibraryBackend` trait.
// - `refresh`: sequential "refresh everything" passes over a backend.
// - `ui`: the terminal menus, delegating all work to the above.
//
// Keeping the `LibraryBackend` seam means the refresher and the menu
// wiring are tested against a mock backend instead of a live server.
pub mod api;
pub mod config;
pub mod error;
pub mod refresh;
pub mod ui;
