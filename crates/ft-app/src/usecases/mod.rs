//! Use cases - the workflows of the field app
//!
//! Each use case is a small struct over `Arc<dyn Port>` handles with a
//! focused public surface. Construction is cheap; the engine hands out
//! fresh instances per screen.

pub mod location;
pub mod nearby;
pub mod onboarding;
pub mod visit;
