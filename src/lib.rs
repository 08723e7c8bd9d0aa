//! Randomizer bot - menu-driven chat bot for everyday random choices
//!
//! A pure conversation state machine (menus, pending input, dice submenu)
//! driven by per-conversation runtimes that hand effects to a transport.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod catalog;
pub mod config;
pub mod console;
pub mod random_ops;
pub mod runtime;
pub mod state_machine;
pub mod validator;
