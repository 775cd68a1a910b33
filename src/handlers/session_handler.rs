use actix_session::{Session, SessionGetError, SessionInsertError};

use crate::models::user_session::{PendingLogin, UserSession};

const USER_SESSION_KEY: &str = "user_session";
const PENDING_LOGIN_KEY: &str = "pending_login";

pub fn store_pending_login(session: &Session, pending: &PendingLogin) -> Result<(), SessionInsertError> {
    session.insert(PENDING_LOGIN_KEY, pending)
}

/// Removes and returns the pending login; it is single use.
pub fn take_pending_login(session: &Session) -> Result<Option<PendingLogin>, SessionGetError> {
    let pending = session.get::<PendingLogin>(PENDING_LOGIN_KEY)?;
    session.remove(PENDING_LOGIN_KEY);
    Ok(pending)
}

pub fn store_user_session(session: &Session, user: &UserSession) -> Result<(), SessionInsertError> {
    session.insert(USER_SESSION_KEY, user)?;
    session.renew();
    Ok(())
}

pub fn current_user(session: &Session) -> Result<Option<UserSession>, SessionGetError> {
    Ok(session
        .get::<UserSession>(USER_SESSION_KEY)?
        .filter(|user| !user.is_expired()))
}

pub fn clear(session: &Session) {
    session.purge();
}
