//! A tick-driven 2D platformer simulated on a character grid.
//!
//! `compute` holds the rules, `entities` the data they act on, `display`
//! turns state into sparse cell updates and `game_loop` ties them together
//! with the intents published by `input`.

pub mod compute;
pub mod config;
pub mod display;
pub mod entities;
pub mod error;
pub mod game_loop;
pub mod input;
pub mod level;
pub mod terminal;
