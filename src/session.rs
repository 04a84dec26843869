use crate::token::CsrfToken;

/// The session facility a session-backed policy delegates to.
///
/// Storage, expiry and persistence are the session's business; the policy
/// only asks for the current token or a rotated one.
pub trait CsrfSession {
    /// Returns the session's token, creating and storing one if absent.
    fn get_csrf_token(&mut self) -> CsrfToken;

    /// Replaces the session's token with a fresh one and returns it.
    fn new_csrf_token(&mut self) -> CsrfToken;
}
