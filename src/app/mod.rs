//! Application core: domain logic behind port traits.
//!
//! This module holds the rules for the lighting node: lamp commands,
//! clock-driven report scheduling, energy accounting and the loop that
//! sequences them. All interaction with hardware and the network happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod commands;
pub mod control_loop;
pub mod events;
pub mod link;
pub mod ports;
pub mod service;
