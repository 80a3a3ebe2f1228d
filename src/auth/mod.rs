//! Подпись запросов к приватному API биржи.
//! Каждый вызов получает свежий JWT (HS256): access key, nonce и SHA-512 хеш query-строки.

use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use std::sync::atomic::{AtomicI64, Ordering};

use crate::error::{DashboardError, Result};

pub const QUERY_HASH_ALG: &str = "SHA512";

/// Пара ключей API биржи. Без любой из половин ключей нет.
#[derive(Clone)]
pub struct Credentials {
    pub access_key: String,
    secret_key: String,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Пустые строки считаются отсутствующими.
    pub fn from_parts(access_key: Option<String>, secret_key: Option<String>) -> Option<Self> {
        let access_key = access_key.filter(|k| !k.trim().is_empty())?;
        let secret_key = secret_key.filter(|k| !k.trim().is_empty())?;
        Some(Self::new(access_key, secret_key))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub access_key: String,
    pub nonce: String,
    pub query_hash: String,
    pub query_hash_alg: String,
}

/// Nonce в миллисекундах, не повторяется в пределах процесса.
#[derive(Debug, Default)]
pub struct NonceSource {
    last: AtomicI64,
}

impl NonceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> i64 {
        self.next_after(chrono::Utc::now().timestamp_millis())
    }

    fn next_after(&self, now_ms: i64) -> i64 {
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = if now_ms > prev { now_ms } else { prev + 1 };
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}

pub fn query_hash(query: &str) -> String {
    format!("{:x}", Sha512::digest(query.as_bytes()))
}

/// Bearer-токен для одного запроса. `query` - сырая query-строка
/// (без `?`), пустая для запросов без параметров.
pub fn create_token(credentials: &Credentials, nonce: i64, query: &str) -> Result<String> {
    let claims = Claims {
        access_key: credentials.access_key.clone(),
        nonce: nonce.to_string(),
        query_hash: query_hash(query),
        query_hash_alg: QUERY_HASH_ALG.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(credentials.secret_key.as_bytes()),
    )
    .map_err(DashboardError::from)
}

/// Подпись запроса; без ключей - ошибка конфигурации.
pub fn authorization_header(
    credentials: Option<&Credentials>,
    nonces: &NonceSource,
    query: &str,
) -> Result<String> {
    let credentials = credentials.ok_or_else(|| {
        DashboardError::Configuration(
            "UPBIT_OPEN_API_ACCESS_KEY and UPBIT_OPEN_API_SECRET_KEY are required".to_string(),
        )
    })?;
    let token = create_token(credentials, nonces.next(), query)?;
    Ok(format!("Bearer {}", token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    fn decode_claims(token: &str, secret: &str) -> Claims {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
            .unwrap()
            .claims
    }

    #[test]
    fn token_carries_signed_claims() {
        let creds = Credentials::new("access", "secret");
        let token = create_token(&creds, 1_700_000_000_000, "").unwrap();

        assert_eq!(token.split('.').count(), 3);
        let claims = decode_claims(&token, "secret");
        assert_eq!(claims.access_key, "access");
        assert_eq!(claims.nonce, "1700000000000");
        assert_eq!(claims.query_hash_alg, "SHA512");
        assert_eq!(claims.query_hash, query_hash(""));
    }

    #[test]
    fn token_rejected_with_wrong_secret() {
        let creds = Credentials::new("access", "secret");
        let token = create_token(&creds, 1, "market=KRW-BTC").unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        let res = decode::<Claims>(&token, &DecodingKey::from_secret(b"other"), &validation);
        assert!(res.is_err());
    }

    #[test]
    fn empty_query_hash_is_sha512_of_nothing() {
        assert_eq!(
            query_hash(""),
            "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce\
             47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
        );
    }

    #[test]
    fn nonce_is_strictly_increasing() {
        let nonces = NonceSource::new();
        assert_eq!(nonces.next_after(1_000), 1_000);
        assert_eq!(nonces.next_after(1_000), 1_001);
        assert_eq!(nonces.next_after(900), 1_002);
        assert_eq!(nonces.next_after(5_000), 5_000);
    }

    #[test]
    fn consecutive_headers_differ() {
        let creds = Credentials::new("access", "secret");
        let nonces = NonceSource::new();
        let a = authorization_header(Some(&creds), &nonces, "").unwrap();
        let b = authorization_header(Some(&creds), &nonces, "").unwrap();
        assert!(a.starts_with("Bearer "));
        assert_ne!(a, b);
    }

    #[test]
    fn signing_without_credentials_is_configuration_error() {
        let nonces = NonceSource::new();
        let err = authorization_header(None, &nonces, "").unwrap_err();
        assert!(matches!(err, DashboardError::Configuration(_)));
    }

    #[test]
    fn blank_parts_mean_no_credentials() {
        assert!(Credentials::from_parts(Some("a".into()), Some("  ".into())).is_none());
        assert!(Credentials::from_parts(None, Some("b".into())).is_none());
        let creds = Credentials::from_parts(Some("a".into()), Some("s3cr3t".into())).unwrap();
        assert!(!format!("{:?}", creds).contains("s3cr3t"));
    }
}
