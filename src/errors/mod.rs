//! Error handling for MKTR.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod encode_error;
pub mod policy_error;
pub mod relax_error;
pub mod structure_error;

pub use config_error::ConfigError;
pub use encode_error::EncodeError;
pub use policy_error::PolicyError;
pub use relax_error::RelaxError;
pub use structure_error::StructureError;
