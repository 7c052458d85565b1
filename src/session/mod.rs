//! Render configuration and the fixed-timestep render loop.

pub mod config;
pub mod render_session;
