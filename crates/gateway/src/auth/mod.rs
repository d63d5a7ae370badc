//! Authentication for the gateway

pub mod cookie;
pub mod credential;
pub mod resolver;
pub mod signer;

pub use cookie::{clear_auth_cookie, extract_auth_token, set_auth_cookie, AUTH_COOKIE_NAME};
pub use credential::UpstreamCredential;
pub use resolver::{AuthError, AuthMode, AuthResolver, Liveness};
pub use signer::{CredentialSigner, SignedToken, SignerError, TOKEN_TTL_MS};
