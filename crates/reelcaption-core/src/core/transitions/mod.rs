//! Caption Transitions Module
//!
//! Turns rendered captions into timed clips: an on-screen window per caption
//! plus opacity, vertical offset and scale curves over that window.
//!
//! # Timing Rules
//!
//! - A clip never starts before its group's first word.
//! - Windows longer than the maximum are cut to `start + max`.
//! - Windows shorter than the minimum are stretched forward, unless that
//!   would collide with the next clip beyond the allowed overlap.
//! - Crossfade and combined styles let a clip linger by the overlap
//!   duration, never more than that past the next clip's start.

mod engine;
mod models;

pub use engine::TransitionEngine;
pub use models::{
    ClipPhase, Curve, Keyframe, TimedClip, TransitionEnvelope, TransitionSpec, TransitionStyle,
};
