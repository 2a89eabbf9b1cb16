//! Terminal playlist player for 30-second track previews.

pub mod audio;
pub mod config;
pub mod controller;
pub mod logging;
pub mod model;
pub mod player;
pub mod search;
pub mod view;
