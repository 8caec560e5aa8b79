//! Effect resolution for purchases.
//!
//! - `EffectChoices`: selections carried in a purchase payload
//! - `grant_privilege`: the single privilege circulation rule
//! - `EffectResolver`: applies card effects and noble claims
//!
//! Effects are one-shot. Unconditional effects (extra turn, privilege) always
//! apply; choice effects need a selection and fall back to a recorded skip.

mod effect;
mod privilege;
mod resolver;

pub use effect::{Choice, EffectChoices, NobleChoice};
pub use privilege::grant_privilege;
pub use resolver::EffectResolver;
