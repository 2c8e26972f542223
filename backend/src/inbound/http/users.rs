//! Account registration, self-service, and token issuance.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::INVALID_CREDENTIALS;
use crate::domain::{
    Credentials, EmailAddress, Error, NewUser, Role, User, UserChanges, UserName,
    UserValidationError, PASSWORD_MIN,
};

use super::auth::{AuthContext, JwtCodec};
use super::error::ApiResult;
use super::state::HttpState;
use super::validation::{invalid_field, missing_field};

const USER_NOT_FOUND: &str = "User not found.";
const ROLE_IMMUTABLE: &str = "Role can't be changed.";

/// Public account representation; the password hash never leaves the store.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserDto {
    /// Account identifier.
    pub id: Uuid,
    /// Normalised email address.
    #[schema(value_type = String)]
    pub email: EmailAddress,
    /// Display name.
    #[schema(value_type = String)]
    pub name: UserName,
    /// Access role.
    #[schema(value_type = String)]
    pub role: Role,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            email: user.email().clone(),
            name: user.name().clone(),
            role: user.role(),
        }
    }
}

fn email_field(raw: &str) -> Result<EmailAddress, Error> {
    EmailAddress::new(raw).map_err(|_| invalid_field("email", "Enter a valid email address."))
}

fn name_field(raw: String) -> Result<UserName, Error> {
    UserName::new(raw).map_err(|err| match err {
        UserValidationError::EmptyName => invalid_field("name", "This field may not be blank."),
        UserValidationError::NameTooLong { max } => invalid_field(
            "name",
            format!("Ensure this field has no more than {max} characters."),
        ),
        _ => Error::internal(err.to_string()),
    })
}

fn password_field(raw: &str) -> Result<&str, Error> {
    if raw.chars().count() < PASSWORD_MIN {
        return Err(invalid_field(
            "password",
            format!("Ensure this field has at least {PASSWORD_MIN} characters."),
        ));
    }
    Ok(raw)
}

/// Payload for self-registration.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Login email, unique across accounts.
    pub email: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Password, at least 5 characters.
    pub password: Option<String>,
    /// Optional; only `reader` is accepted, which is also the default.
    pub role: Option<String>,
}

/// Register a new reader account.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserDto),
        (status = 400, description = "Validation failed or email taken", body = Error)
    )
)]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let email = email_field(&payload.email.ok_or_else(|| missing_field("email"))?)?;
    let name = name_field(payload.name.ok_or_else(|| missing_field("name"))?)?;
    let password = payload.password.ok_or_else(|| missing_field("password"))?;
    let password = password_field(&password)?;
    if let Some(role) = payload.role {
        // Self-registration always yields a reader; privileged roles are
        // provisioned out of band.
        if role != Role::Reader.as_str() {
            return Err(invalid_field("role", ROLE_IMMUTABLE));
        }
    }
    let hash = state.hasher.hash(password)?;
    let user = state.users.create(NewUser::reader(email, name, hash)).await?;
    Ok(HttpResponse::Created().json(UserDto::from(&user)))
}

/// Fetch the authenticated account.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "The caller's account", body = UserDto),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    )
)]
pub async fn me(state: web::Data<HttpState>, auth: AuthContext) -> ApiResult<web::Json<UserDto>> {
    let actor = auth.require()?;
    let user = state
        .users
        .find_by_id(actor.id)
        .await?
        .ok_or_else(|| Error::not_found(USER_NOT_FOUND))?;
    Ok(web::Json(UserDto::from(&user)))
}

/// Payload for self-service account updates.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    /// Replacement email.
    pub email: Option<String>,
    /// Replacement display name.
    pub name: Option<String>,
    /// Replacement password, re-hashed before storage.
    pub password: Option<String>,
    /// Rejected whenever present, even unchanged or `null`.
    #[schema(value_type = Option<String>)]
    pub role: Option<Value>,
}

/// Update the authenticated account.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated account", body = UserDto),
        (status = 400, description = "Validation failed or role supplied", body = Error),
        (status = 401, description = "Not authenticated", body = Error)
    )
)]
pub async fn update_me(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserDto>> {
    let actor = auth.require()?;
    let payload = payload.into_inner();
    if payload.role.is_some() {
        return Err(invalid_field("role", ROLE_IMMUTABLE));
    }
    let email = payload.email.as_deref().map(email_field).transpose()?;
    let name = payload.name.map(name_field).transpose()?;
    let password_hash = payload
        .password
        .as_deref()
        .map(password_field)
        .transpose()?
        .map(|password| state.hasher.hash(password))
        .transpose()?;
    let changes = UserChanges {
        email,
        name,
        password_hash,
    };
    let user = state.users.update(actor.id, changes).await?;
    Ok(web::Json(UserDto::from(&user)))
}

/// Delete the authenticated account.
#[utoipa::path(
    delete,
    path = "/api/v1/users/me",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Not authenticated", body = Error)
    )
)]
pub async fn delete_me(state: web::Data<HttpState>, auth: AuthContext) -> ApiResult<HttpResponse> {
    let actor = auth.require()?;
    state.users.delete(actor.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Payload for obtaining an access token.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    /// Account email.
    pub email: Option<String>,
    /// Account password.
    pub password: Option<String>,
}

/// Issued access token.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Bearer token for the `Authorization` header.
    pub access: String,
}

/// Exchange credentials for an access token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Missing or blank fields", body = Error),
        (status = 401, description = "Credentials rejected", body = Error)
    )
)]
pub async fn token(
    state: web::Data<HttpState>,
    codec: web::Data<JwtCodec>,
    payload: web::Json<TokenRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let payload = payload.into_inner();
    let email = payload.email.ok_or_else(|| missing_field("email"))?;
    let password = payload.password.ok_or_else(|| missing_field("password"))?;
    if password.is_empty() {
        return Err(invalid_field("password", "This field may not be blank."));
    }
    // A malformed email cannot belong to any account; fail like a bad login
    // rather than leaking which part of the credential pair was wrong.
    let credentials = Credentials::try_from_parts(&email, &password)
        .map_err(|_| Error::unauthorized(INVALID_CREDENTIALS))?;
    let actor = state.login.authenticate(&credentials).await?;
    let access = codec.issue(actor, Utc::now())?;
    Ok(web::Json(TokenResponse { access }))
}
