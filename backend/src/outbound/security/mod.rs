//! Security adapters: bearer token signing and password hashing.

mod jwt_token_codec;
mod sha_password_hasher;

pub use jwt_token_codec::JwtTokenCodec;
pub use sha_password_hasher::ShaPasswordHasher;
