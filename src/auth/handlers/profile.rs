/**
 * Profile Handler
 *
 * Example protected collaborator: returns the identity the Access Guard
 * admitted. Anything nested under `/protected` gets the same treatment.
 */

use axum::response::Json;

use crate::auth::handlers::types::IdentityResponse;
use crate::middleware::guard::AuthIdentity;

/// `GET /protected/profile`
pub async fn profile(AuthIdentity(identity): AuthIdentity) -> Json<IdentityResponse> {
    Json(identity.into())
}
