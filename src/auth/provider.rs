//! Identity provider client
//!
//! Sign-in goes through the Firebase Identity Toolkit REST API. A password
//! sign-in yields an ID token (sent to the document store as a bearer token)
//! and a refresh token, which is cached so later runs can resume the session
//! without asking for the password again.

use std::fmt;
use std::future::Future;

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use super::credentials::{CredentialCache, mask_token};
use super::error::AuthError;
use crate::store::wire::ErrorResponse;

/// How a principal proves who they are
#[derive(Clone)]
pub enum SignIn {
    Password { email: String, password: String },
    /// Resume a session from a previously issued refresh token
    RefreshToken(String),
}

impl fmt::Debug for SignIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignIn::Password { email, .. } => {
                f.debug_struct("Password").field("email", email).field("password", &"***").finish()
            }
            SignIn::RefreshToken(token) => f.debug_tuple("RefreshToken").field(&mask_token(token)).finish(),
        }
    }
}

/// The authenticated user
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    /// Short-lived token authorizing store requests on the principal's behalf
    pub id_token: String,
}

impl Principal {
    /// Name to greet the principal with
    pub fn display_label(&self) -> &str {
        self.display_name.as_deref().or(self.email.as_deref()).unwrap_or(&self.uid)
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("photo_url", &self.photo_url)
            .field("id_token", &mask_token(&self.id_token))
            .finish()
    }
}

/// An external service that authenticates principals
pub trait IdentityProvider {
    fn sign_in(&self, request: &SignIn) -> impl Future<Output = Result<Principal, AuthError>> + Send;

    /// End the local session
    fn sign_out(&self) -> Result<(), AuthError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    id_token: String,
    refresh_token: String,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'static str,
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<UserInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserInfo {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
}

/// Map a provider error response onto an auth error
fn provider_error(status: u16, body: &str) -> AuthError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());
    // Messages look like "INVALID_PASSWORD" or "TOO_MANY_ATTEMPTS_TRY_LATER : details".
    let code = message.split([' ', ':']).next().unwrap_or_default();

    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_EMAIL"
        | "USER_DISABLED" => AuthError::InvalidCredentials,
        "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "INVALID_ID_TOKEN" | "USER_NOT_FOUND" => {
            AuthError::SessionExpired
        }
        _ => AuthError::ApiError { status, message },
    }
}

/// Identity Toolkit client for one project
pub struct FirebaseAuth {
    client: Client,
    /// `https://identitytoolkit.googleapis.com/v1` or an emulator equivalent
    identity_url: String,
    /// Secure Token endpoint used to exchange refresh tokens
    token_url: String,
    api_key: String,
}

impl FirebaseAuth {
    const IDENTITY_URL: &'static str = "https://identitytoolkit.googleapis.com/v1";
    const TOKEN_URL: &'static str = "https://securetoken.googleapis.com/v1/token";

    pub fn new(api_key: impl Into<String>) -> Result<Self, AuthError> {
        Self::with_urls(Self::IDENTITY_URL.to_string(), Self::TOKEN_URL.to_string(), api_key.into())
    }

    /// Create a client talking to a local Auth emulator (`host:port`)
    pub fn with_emulator(host: &str, api_key: impl Into<String>) -> Result<Self, AuthError> {
        let host = host.trim_end_matches('/');
        let api_key = Some(api_key.into()).filter(|k| !k.is_empty()).unwrap_or_else(|| "emulator".into());
        Self::with_urls(
            format!("http://{}/identitytoolkit.googleapis.com/v1", host),
            format!("http://{}/securetoken.googleapis.com/v1/token", host),
            api_key,
        )
    }

    fn with_urls(identity_url: String, token_url: String, api_key: String) -> Result<Self, AuthError> {
        let client = Client::builder().user_agent(concat!("lectern/", env!("CARGO_PKG_VERSION"))).build()?;
        Ok(Self { client, identity_url, token_url, api_key })
    }

    fn accounts_url(&self, method: &str) -> String {
        format!("{}/accounts:{}", self.identity_url, method)
    }

    async fn check(response: Response) -> Result<Response, AuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(provider_error(status.as_u16(), &body))
    }

    async fn password_sign_in(&self, email: &str, password: &str) -> Result<(String, String), AuthError> {
        tracing::debug!("identity toolkit signInWithPassword for {}", email);
        let response = self
            .client
            .post(self.accounts_url("signInWithPassword"))
            .query(&[("key", &self.api_key)])
            .json(&PasswordRequest { email, password, return_secure_token: true })
            .send()
            .await?;

        let tokens: PasswordResponse = serde_json::from_str(&Self::check(response).await?.text().await?)?;
        Ok((tokens.id_token, tokens.refresh_token))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<(String, String), AuthError> {
        tracing::debug!("secure token refresh");
        let response = self
            .client
            .post(&self.token_url)
            .query(&[("key", &self.api_key)])
            .form(&RefreshRequest { grant_type: "refresh_token", refresh_token })
            .send()
            .await?;

        let tokens: RefreshResponse = serde_json::from_str(&Self::check(response).await?.text().await?)?;
        Ok((tokens.id_token, tokens.refresh_token))
    }

    async fn lookup(&self, id_token: &str) -> Result<UserInfo, AuthError> {
        let response = self
            .client
            .post(self.accounts_url("lookup"))
            .query(&[("key", &self.api_key)])
            .json(&LookupRequest { id_token })
            .send()
            .await?;

        let lookup: LookupResponse = serde_json::from_str(&Self::check(response).await?.text().await?)?;
        lookup.users.into_iter().next().ok_or(AuthError::SessionExpired)
    }
}

impl IdentityProvider for FirebaseAuth {
    async fn sign_in(&self, request: &SignIn) -> Result<Principal, AuthError> {
        let (id_token, refresh_token) = match request {
            SignIn::Password { email, password } => self.password_sign_in(email, password).await?,
            SignIn::RefreshToken(token) => self.refresh(token).await?,
        };
        let user = self.lookup(&id_token).await?;

        // A session that cannot be cached still works for this run.
        if let Err(e) = CredentialCache::store_refresh_token(&refresh_token) {
            tracing::warn!("could not cache session: {}", e);
        }

        Ok(Principal {
            uid: user.local_id,
            email: user.email,
            display_name: user.display_name,
            photo_url: user.photo_url,
            id_token,
        })
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        CredentialCache::clear()
    }
}
