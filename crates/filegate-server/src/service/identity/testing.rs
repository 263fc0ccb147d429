//! HMAC-signed tokens for tests.

use jiff::Timestamp;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};

use super::{JwtVerifier, KeySource};

pub(crate) const PROJECT: &str = "filegate-test";
pub(crate) const SECRET: &[u8] = b"filegate-test-signing-secret-0001";
pub(crate) const KID: &str = "test-key-1";

/// `SECRET` as a one-key JWK set.
pub(crate) const JWKS: &str = r#"{"keys":[{"kty":"oct","kid":"test-key-1","alg":"HS256","k":"ZmlsZWdhdGUtdGVzdC1zaWduaW5nLXNlY3JldC0wMDAx"}]}"#;

/// Claims of a token valid for the next hour.
pub(crate) fn claims(subject: &str) -> Value {
    let now = Timestamp::now().as_second();
    json!({
        "sub": subject,
        "email": format!("{subject}@example.com"),
        "iss": format!("{}{}", JwtVerifier::ISSUER_PREFIX, PROJECT),
        "aud": PROJECT,
        "iat": now,
        "exp": now + 3600,
    })
}

pub(crate) fn sign(claims: &Value) -> String {
    let header = Header {
        kid: Some(KID.to_owned()),
        ..Header::new(Algorithm::HS256)
    };
    encode(&header, claims, &EncodingKey::from_secret(SECRET)).unwrap()
}

/// A valid bearer token for `subject`.
pub(crate) fn token(subject: &str) -> String {
    sign(&claims(subject))
}

pub(crate) fn verifier() -> JwtVerifier {
    JwtVerifier::new(PROJECT, KeySource::secret(SECRET)).with_algorithm(Algorithm::HS256)
}
