//! Inbound message handling
//!
//! Three stages between raw socket bytes and a pipeline-ready track:
//! decode (bytes → JSON), validate (structural checks), build
//! (normalization and classification). Decode failures drop the
//! connection, validation failures drop the message; neither touches
//! pipeline state.

pub mod decoder;
pub mod factory;
pub mod validator;

pub use decoder::{decode_payload, DecodeError};
pub use factory::build_track;
pub use validator::{validate, ValidationRejected};
