//! Utility library for the DID-based building blocks of the connector:
//! Ed25519/X25519 key material, multibase/multicodec encoding, JSON Web
//! Keys, compact JWS and the `did:peer` method (numalgo 2).

pub mod crypto;
pub mod didcore;
pub mod jwk;
pub mod jws;
pub mod methods;
