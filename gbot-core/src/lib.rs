//! Gesture-to-motion command pipeline for a glove sensor node and a
//! differential-drive robot on no-std embedded platforms.
//!
//! For a runnable host simulation of both nodes, see `gbot-app/mock-mcu`.
#![no_std]

pub mod utils;
