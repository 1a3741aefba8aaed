//! Principal resolution shared by handlers that require a login.
//!
//! Keeps handlers focused on request/response mapping: the cookie yields a
//! session id and the login service turns it into a user.

use crate::domain::User;

use super::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;

/// Resolve the logged-in user or fail with `401 Unauthorized`.
pub(crate) async fn require_user(state: &HttpState, session: &SessionContext) -> ApiResult<User> {
    let session_id = session.require_session_id()?;
    state.login.current_user(&session_id).await
}
