//! Data model and event vocabulary shared by the task store and its
//! collaborators.

pub mod domain;
pub mod error;
pub mod protocol;
