//! Foundation utilities shared by every engine subsystem

pub mod math;

pub use math::{Transform2D, Vec2};
