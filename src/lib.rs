// Search-results merge library - exposes all core modules for testing

pub mod commands;
pub mod config;
pub mod config_io;
pub mod model;
pub mod primitives;
pub mod services;
pub mod session;
