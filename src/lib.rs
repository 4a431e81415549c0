pub mod api;
pub mod backup;
pub mod bundler;
pub mod config;
pub mod docroot;
pub mod logging;
pub mod manifest;
pub mod roster;
pub mod scaffold;
