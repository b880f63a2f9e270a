//! Data model for step-by-step snippet tutorials.
//!
//! A tutorial is an ordered list of [`Step`]s. Each step points at a content
//! asset carrying marker tokens, an optional prefill fragment, and an ordered
//! list of structural [`Rule`]s the learner's edit must satisfy.

pub mod definition;
pub mod error;
pub mod options;

pub use definition::{Rule, Step, TutorialDefinition, load_tutorial};
pub use error::{ModelError, Result};
pub use options::{MarkerPair, MarkerTokens, Messages, TutorOptions};
