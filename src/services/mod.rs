// src/services/mod.rs
pub mod admin_form;
pub mod embed;
pub mod mode_selector;
pub mod player;
pub mod session;
pub mod viewer;
pub mod viewer_state;
