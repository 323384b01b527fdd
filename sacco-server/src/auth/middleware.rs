//! Authentication middleware

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};
use shared::error::AppError;
use shared::permissions::Capability;

use crate::auth::CurrentUser;
use crate::security_log;
use crate::state::AppState;

/// Require a live session; injects [`CurrentUser`] into request extensions.
///
/// CORS preflight requests pass through untouched. When the session was
/// extended the response carries a fresh session cookie.
pub async fn require_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let (mut parts, body) = req.into_parts();
    let user = CurrentUser::from_request_parts(&mut parts, &state).await?;
    let renewal = user.renewal_cookie(&state.config);
    parts.extensions.insert(user);

    let mut response = next.run(Request::from_parts(parts, body)).await;
    if let Some(cookie) = renewal {
        append_cookie(&mut response, &cookie);
    }
    Ok(response)
}

pub(crate) fn append_cookie(response: &mut Response, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::warn!(error = %e, "Session cookie is not a valid header value"),
    }
}

/// Require a capability of the signed-in user's role.
///
/// Must run inside [`require_auth`]; 403 when the role lacks `capability`.
///
/// ```ignore
/// Router::new()
///     .route("/admin/users", get(handler::list))
///     .layer(middleware::from_fn(require_permission(Capability::ManageUsers)));
/// ```
pub fn require_permission(
    capability: Capability,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::unauthorized())?;

            if !user.can(capability) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id(),
                    username = user.username().to_string(),
                    required_permission = capability.as_str()
                );
                return Err(AppError::forbidden(format!(
                    "Permission denied: {}",
                    capability.as_str()
                )));
            }

            Ok(next.run(req).await)
        })
    }
}
