//! Bearer-token issuance and verification.
//!
//! Tokens are stateless HS256 JWTs carrying the account id and role as
//! claims, so request handling never needs a repository round-trip to
//! establish the caller's identity.

use std::future::{ready, Ready};

use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Actor, Error, Role};

const INVALID_TOKEN: &str = "Invalid or expired token.";

/// Claims carried in an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account identifier.
    pub sub: Uuid,
    /// Access role at issuance time.
    pub role: Role,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Signs and verifies access tokens.
#[derive(Clone)]
pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtCodec {
    /// Build a codec from the shared secret and token lifetime.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Issue a token for an authenticated actor.
    pub fn issue(&self, actor: Actor, now: DateTime<Utc>) -> Result<String, Error> {
        let claims = Claims {
            sub: actor.id,
            role: actor.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| Error::internal(format!("failed to sign token: {err}")))
    }

    /// Verify a token and recover the actor it was issued to.
    pub fn verify(&self, token: &str) -> Result<Actor, Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| Error::unauthorized(INVALID_TOKEN))?;
        Ok(Actor {
            id: data.claims.sub,
            role: data.claims.role,
        })
    }
}

/// Optional authentication context extracted from the `Authorization` header.
///
/// Absence of the header is not an error at extraction time; the policy layer
/// decides whether an anonymous request may proceed. A header that is present
/// but unusable is rejected outright so a client with a stale token learns
/// about it immediately.
pub struct AuthContext {
    actor: Option<Actor>,
}

impl AuthContext {
    /// The authenticated actor, when a valid token was presented.
    pub fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    /// Require authentication, failing as the policy layer would.
    pub fn require(&self) -> Result<&Actor, Error> {
        self.actor
            .as_ref()
            .ok_or_else(|| Error::unauthorized("Authentication credentials were not provided."))
    }

    #[cfg(test)]
    pub fn anonymous() -> Self {
        Self { actor: None }
    }
}

fn bearer_token(req: &HttpRequest) -> Result<Option<&str>, Error> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| Error::unauthorized(INVALID_TOKEN))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::unauthorized(INVALID_TOKEN))?;
    Ok(Some(token))
}

impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let result = (|| {
            let Some(codec) = req.app_data::<web::Data<JwtCodec>>() else {
                return Err(Error::internal("token codec is not configured"));
            };
            let actor = bearer_token(req)?
                .map(|token| codec.verify(token))
                .transpose()?;
            Ok(Self { actor })
        })();
        ready(result)
    }
}
