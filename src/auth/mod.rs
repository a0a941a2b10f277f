//! Sign-in and admin access control

pub mod credentials;
pub mod error;
pub mod gate;
pub mod provider;

pub use credentials::CredentialCache;
pub use error::AuthError;
pub use gate::{Access, AccessGate};
pub use provider::{FirebaseAuth, IdentityProvider, Principal, SignIn};
