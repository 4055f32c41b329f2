use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};

use crate::auth::Principal;
use crate::models::auth_model::Claims;

/// Issues and verifies HS256 access tokens.
#[derive(Clone)]
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in_minutes: i64,
}

impl JwtUtils {
    pub fn new(secret: &str, expires_in_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expires_in_minutes,
        }
    }

    /// Returns the token and its expiry as a unix timestamp.
    pub fn generate_jwt(&self, principal: &Principal) -> Result<(String, usize), jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let expire = now + Duration::minutes(self.expires_in_minutes);
        let claims = Claims {
            sub: principal.username.clone(),
            role: principal.role,
            iat: now.timestamp() as usize,
            exp: expire.timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok((token, claims.exp))
    }

    pub fn validate_jwt(&self, token: &str) -> Result<TokenData<Claims>, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        decode::<Claims>(token, &self.decoding_key, &validation)
    }
}
