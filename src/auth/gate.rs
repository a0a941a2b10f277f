//! Admin access gate
//!
//! Write access to the catalog requires a principal whose email is on the
//! admin allow-list. The gate only constructs an [`AdminConsole`] inside the
//! [`Access::Admin`] state, so a principal that failed the lookup has no way
//! to reach the create, update or delete paths.

use super::error::AuthError;
use super::provider::{IdentityProvider, Principal, SignIn};
use crate::admin::{AdminConsole, AdminError};
use crate::store::{ADMINS, DocumentStore, Value};

/// Allow-list field holding the admin's email address
pub const ADMIN_EMAIL: &str = "email";

/// What the current session may do
#[derive(Debug, Default)]
pub enum Access {
    #[default]
    Unauthenticated,
    /// Signed in but not on the allow-list; may only sign out
    NonAdmin(Principal),
    Admin { principal: Principal, console: AdminConsole },
}

pub struct AccessGate<P> {
    provider: P,
    access: Access,
}

impl<P: IdentityProvider> AccessGate<P> {
    pub fn new(provider: P) -> Self {
        Self { provider, access: Access::Unauthenticated }
    }

    pub fn access(&self) -> &Access {
        &self.access
    }

    pub fn principal(&self) -> Option<&Principal> {
        match &self.access {
            Access::Unauthenticated => None,
            Access::NonAdmin(principal) | Access::Admin { principal, .. } => Some(principal),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.access, Access::Admin { .. })
    }

    /// Authenticate and decide admin access with a single allow-list lookup.
    ///
    /// Any earlier session is ended first. On failure the gate is left
    /// unauthenticated.
    pub async fn sign_in<S: DocumentStore>(
        &mut self,
        store: &S,
        request: &SignIn,
    ) -> Result<&Access, AuthError> {
        self.end_session(store);

        let principal = self.provider.sign_in(request).await?;
        store.set_id_token(Some(principal.id_token.clone()));

        let is_admin = match &principal.email {
            Some(email) => match store.query_eq(ADMINS, ADMIN_EMAIL, Value::from(email.as_str())).await {
                Ok(matches) => !matches.is_empty(),
                Err(e) => {
                    store.set_id_token(None);
                    return Err(e.into());
                }
            },
            None => false,
        };

        tracing::info!(
            "signed in as {} ({})",
            principal.display_label(),
            if is_admin { "admin" } else { "not an admin" }
        );
        self.access = if is_admin {
            Access::Admin { principal, console: AdminConsole::new() }
        } else {
            Access::NonAdmin(principal)
        };
        Ok(&self.access)
    }

    /// The admin console, available only to allow-listed principals
    pub fn console(&mut self) -> Result<&mut AdminConsole, AdminError> {
        match &mut self.access {
            Access::Admin { console, .. } => Ok(console),
            _ => Err(AdminError::Forbidden),
        }
    }

    /// Return to the unauthenticated state, dropping any cached admin data
    pub fn sign_out<S: DocumentStore>(&mut self, store: &S) -> Result<(), AuthError> {
        self.end_session(store);
        self.provider.sign_out()
    }

    fn end_session<S: DocumentStore>(&mut self, store: &S) {
        if !matches!(self.access, Access::Unauthenticated) {
            tracing::info!("signed out");
        }
        self.access = Access::Unauthenticated;
        store.set_id_token(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Video;
    use crate::store::memory::MemoryStore;
    use crate::store::{Fields, VIDEOS};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeProvider {
        email: Option<String>,
        sign_outs: AtomicUsize,
    }

    impl FakeProvider {
        fn with_email(email: &str) -> Self {
            Self { email: Some(email.into()), sign_outs: AtomicUsize::new(0) }
        }
    }

    impl IdentityProvider for FakeProvider {
        async fn sign_in(&self, request: &SignIn) -> Result<Principal, AuthError> {
            if let SignIn::Password { password, .. } = request {
                if password != "correct" {
                    return Err(AuthError::InvalidCredentials);
                }
            }
            Ok(Principal {
                uid: "u1".into(),
                email: self.email.clone(),
                display_name: None,
                photo_url: None,
                id_token: "id-token".into(),
            })
        }

        fn sign_out(&self) -> Result<(), AuthError> {
            self.sign_outs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn password(email: &str, password: &str) -> SignIn {
        SignIn::Password { email: email.into(), password: password.into() }
    }

    fn store_with_admin(email: &str) -> MemoryStore {
        let store = MemoryStore::new();
        store.insert(ADMINS, "a1", Fields::from([(ADMIN_EMAIL.to_string(), Value::from(email))]));
        store.insert(VIDEOS, "v1", Video::fields("Intro", "https://example.com/1", ""));
        store
    }

    #[tokio::test]
    async fn allow_listed_principal_gets_console() {
        let store = store_with_admin("ada@example.com");
        let mut gate = AccessGate::new(FakeProvider::with_email("ada@example.com"));

        gate.sign_in(&store, &password("ada@example.com", "correct")).await.unwrap();

        assert!(gate.is_admin());
        assert_eq!(store.read_count(), 1);
        assert_eq!(store.id_token(), Some("id-token".to_string()));
        assert!(gate.console().is_ok());
    }

    #[tokio::test]
    async fn non_admin_never_reaches_the_write_path() {
        let store = store_with_admin("ada@example.com");
        let mut gate = AccessGate::new(FakeProvider::with_email("bob@example.com"));

        let access = gate.sign_in(&store, &password("bob@example.com", "correct")).await.unwrap();
        assert!(matches!(access, Access::NonAdmin(p) if p.email.as_deref() == Some("bob@example.com")));

        let attempt = match gate.console() {
            Ok(console) => console.submit_video(&store).await.map(|_| ()),
            Err(e) => Err(e),
        };
        assert!(matches!(attempt, Err(AdminError::Forbidden)));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn principal_without_email_is_not_admin() {
        let store = store_with_admin("ada@example.com");
        let mut gate =
            AccessGate::new(FakeProvider { email: None, sign_outs: AtomicUsize::new(0) });

        gate.sign_in(&store, &SignIn::RefreshToken("r".into())).await.unwrap();

        assert!(matches!(gate.access(), Access::NonAdmin(_)));
        assert_eq!(store.read_count(), 0);
    }

    #[tokio::test]
    async fn failed_sign_in_stays_unauthenticated() {
        let store = store_with_admin("ada@example.com");
        let mut gate = AccessGate::new(FakeProvider::with_email("ada@example.com"));

        let result = gate.sign_in(&store, &password("ada@example.com", "wrong")).await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert!(matches!(gate.access(), Access::Unauthenticated));
        assert_eq!(store.read_count(), 0);
        assert_eq!(store.id_token(), None);
    }

    #[tokio::test]
    async fn sign_out_discards_console_and_token() {
        let store = store_with_admin("ada@example.com");
        let mut gate = AccessGate::new(FakeProvider::with_email("ada@example.com"));
        gate.sign_in(&store, &password("ada@example.com", "correct")).await.unwrap();
        gate.console().unwrap().refresh_videos(&store).await.unwrap();

        gate.sign_out(&store).unwrap();

        assert!(matches!(gate.access(), Access::Unauthenticated));
        assert!(gate.principal().is_none());
        assert!(matches!(gate.console(), Err(AdminError::Forbidden)));
        assert_eq!(store.id_token(), None);
        assert_eq!(gate.provider.sign_outs.load(Ordering::SeqCst), 1);
    }
}
