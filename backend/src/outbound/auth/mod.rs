//! Bearer token verification adapters.

mod hs256_token_verifier;

pub use hs256_token_verifier::Hs256TokenVerifier;
