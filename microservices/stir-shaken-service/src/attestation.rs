//! Authentication Service host (C5, ambient).

mod signer;

pub use signer::{AttestationSigner, SignError};
