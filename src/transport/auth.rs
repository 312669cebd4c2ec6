//! Credentials and request signing
//!
//! Credential acquisition itself lives behind [`ProvideCredentials`];
//! this module supplies the pieces most clients need: a static provider,
//! an expiry-buffered caching wrapper, and the default header signer.

use super::{CredentialsError, ProvideCredentials, Request, Signer, SigningError};
use async_trait::async_trait;
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Token expiry buffer - treat tokens as expired this much before they
/// actually are, so a token never runs out mid-request
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Signing credentials
#[derive(Clone)]
pub struct Credentials {
    token: String,
    expires_at: Option<Instant>,
}

impl Credentials {
    /// Credentials that never expire.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
        }
    }

    /// Credentials valid for `ttl` from now.
    pub fn expiring(token: impl Into<String>, ttl: Duration) -> Self {
        Self {
            token: token.into(),
            expires_at: Some(Instant::now() + ttl),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether the token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Instant::now() + TOKEN_EXPIRY_BUFFER >= expires_at,
            None => false,
        }
    }
}

// Token material must not leak into logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Provider holding one fixed set of credentials
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(token),
        }
    }
}

impl From<Credentials> for StaticCredentials {
    fn from(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl ProvideCredentials for StaticCredentials {
    async fn credentials(&self) -> Result<Credentials, CredentialsError> {
        if self.credentials.token().is_empty() {
            return Err(CredentialsError::NotFound(
                "no credentials configured".to_string(),
            ));
        }
        Ok(self.credentials.clone())
    }
}

/// Expiry-buffered cache around an inner provider
pub struct CachingProvider<P> {
    inner: P,
    cache: Arc<RwLock<Option<Credentials>>>,
}

impl<P: ProvideCredentials> CachingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Drop the cached credentials and fetch fresh ones.
    pub async fn refresh(&self) -> Result<Credentials, CredentialsError> {
        {
            let mut cache = self.cache.write().await;
            *cache = None;
        }
        self.credentials().await
    }
}

#[async_trait]
impl<P: ProvideCredentials> ProvideCredentials for CachingProvider<P> {
    async fn credentials(&self) -> Result<Credentials, CredentialsError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if !cached.is_expired() {
                    return Ok(cached.clone());
                }
                tracing::debug!("cached credentials expired, fetching new ones");
            }
        }

        let fresh = self.inner.credentials().await?;

        {
            let mut cache = self.cache.write().await;
            *cache = Some(fresh.clone());
        }

        Ok(fresh)
    }
}

/// Default signer: bearer token plus request metadata headers
#[derive(Debug, Clone, Default)]
pub struct TokenSigner;

impl Signer for TokenSigner {
    fn sign(&self, request: &mut Request, credentials: &Credentials) -> Result<(), SigningError> {
        if credentials.token().is_empty() {
            return Err(SigningError::Credentials("empty token".to_string()));
        }
        if credentials.is_expired() {
            return Err(SigningError::Credentials("token expired".to_string()));
        }

        request.set_header("authorization", format!("Bearer {}", credentials.token()));
        request.set_header(
            "x-amz-date",
            Utc::now().format("%Y%m%dT%H%M%SZ").to_string(),
        );
        if request.header("amz-sdk-invocation-id").is_none() {
            request.set_header("amz-sdk-invocation-id", Uuid::new_v4().to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: Arc<AtomicUsize>,
        ttl: Duration,
    }

    #[async_trait]
    impl ProvideCredentials for CountingProvider {
        async fn credentials(&self) -> Result<Credentials, CredentialsError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Credentials::expiring(format!("token-{n}"), self.ttl))
        }
    }

    #[test]
    fn expiry_buffer_applies() {
        assert!(Credentials::expiring("t", Duration::ZERO).is_expired());
        assert!(!Credentials::expiring("t", Duration::from_secs(3600)).is_expired());
        assert!(!Credentials::new("t").is_expired());
    }

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", Credentials::new("s3cr3t"));
        assert!(!rendered.contains("s3cr3t"));
    }

    #[tokio::test]
    async fn caching_provider_fetches_once_while_valid() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CachingProvider::new(CountingProvider {
            calls: Arc::clone(&calls),
            ttl: Duration::from_secs(3600),
        });

        let first = provider.credentials().await.unwrap();
        let second = provider.credentials().await.unwrap();
        assert_eq!(first.token(), second.token());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn caching_provider_refetches_expired_tokens() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CachingProvider::new(CountingProvider {
            calls: Arc::clone(&calls),
            ttl: Duration::ZERO,
        });

        provider.credentials().await.unwrap();
        provider.credentials().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn refresh_clears_the_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CachingProvider::new(CountingProvider {
            calls: Arc::clone(&calls),
            ttl: Duration::from_secs(3600),
        });

        provider.credentials().await.unwrap();
        provider.refresh().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn signer_sets_auth_and_metadata_headers() {
        let mut request = Request::new("GET", "/widgets");
        TokenSigner
            .sign(&mut request, &Credentials::new("test-token"))
            .unwrap();
        assert_eq!(request.header("authorization"), Some("Bearer test-token"));
        assert!(request.header("x-amz-date").is_some());
        assert!(request.header("amz-sdk-invocation-id").is_some());
    }

    #[test]
    fn signer_rejects_expired_and_empty_credentials() {
        let mut request = Request::new("GET", "/widgets");
        assert!(TokenSigner
            .sign(&mut request, &Credentials::new(""))
            .is_err());
        assert!(TokenSigner
            .sign(&mut request, &Credentials::expiring("t", Duration::ZERO))
            .is_err());
    }
}
