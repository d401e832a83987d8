#[macro_use]
extern crate tracing;

pub mod chart;
pub mod cmd;
pub mod constants;
pub mod errors;
pub mod helm;
pub mod logger;
pub mod manifest;
pub mod render;
pub mod settings;
mod template;
mod tera_utils;
pub mod thunder_config;
pub mod values;
pub mod verifier;

pub use errors::VerifierError;
pub use verifier::RenderVerifier;
