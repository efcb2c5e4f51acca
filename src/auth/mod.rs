use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Claim names checked for the subject, in order
pub const SUBJECT_CLAIMS: [&str; 3] = ["user_id", "sub", "uid"];

/// Claims this service issues. Tokens from the user service carry more;
/// verification reads them as a free-form map.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user_id: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            user_id: user_id.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JwtError {
    MissingHeader,
    InvalidHeader,
    InvalidToken(String),
    InvalidClaims,
    MissingSubject,
    InvalidSubject,
    InvalidSecret,
    TokenGeneration(String),
}

impl JwtError {
    /// English / Korean message returned to clients
    pub fn client_message(&self) -> &'static str {
        match self {
            JwtError::MissingHeader => "Authorization header is required / 인증이 필요합니다",
            JwtError::InvalidHeader => "Invalid authorization header format / 잘못된 인증 헤더 형식입니다",
            JwtError::InvalidToken(_) => "Invalid or expired token / 유효하지 않거나 만료된 토큰입니다",
            JwtError::InvalidClaims => "Invalid token claims / 유효하지 않은 토큰 정보입니다",
            JwtError::MissingSubject => "User ID not found in token / 토큰에서 사용자 ID를 찾을 수 없습니다",
            JwtError::InvalidSubject => "Invalid user ID format / 유효하지 않은 사용자 ID 형식입니다",
            JwtError::InvalidSecret | JwtError::TokenGeneration(_) => {
                "Authentication is not available / 인증을 처리할 수 없습니다"
            }
        }
    }
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::InvalidToken(msg) => write!(f, "Invalid JWT token: {}", msg),
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
            other => write!(f, "{}", other.client_message()),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Verify an HS256 token and return the subject as a UUID
pub fn verify_jwt(token: &str, secret: &str) -> Result<Uuid, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    // `exp` is still validated when present
    let mut validation = Validation::default();
    validation.required_spec_claims.clear();

    let token_data = decode::<Map<String, Value>>(token, &decoding_key, &validation)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    subject_from_claims(&token_data.claims)
}

/// First string claim among `user_id`, `sub`, `uid`, parsed as a UUID
pub fn subject_from_claims(claims: &Map<String, Value>) -> Result<Uuid, JwtError> {
    let subject = SUBJECT_CLAIMS
        .iter()
        .find_map(|name| claims.get(*name).and_then(Value::as_str))
        .ok_or(JwtError::MissingSubject)?;

    Uuid::parse_str(subject).map_err(|_| JwtError::InvalidSubject)
}
