//! Template integration.
//!
//! Renderers collect globals before rendering. [`add_csrf_token_global`]
//! contributes a `get_csrf_token` callable so templates can embed the token
//! in a hidden field without reaching for the policy themselves.

use std::collections::HashMap;
use std::fmt;

use crate::context::RequestContext;
use crate::error::Result;
use crate::token::CsrfToken;

/// Key under which the token getter is registered.
pub const CSRF_TOKEN_GLOBAL: &str = "get_csrf_token";

type Global<'r> = Box<dyn FnMut() -> Result<CsrfToken> + 'r>;

/// Zero-argument callables made available to a template.
#[derive(Default)]
pub struct RenderGlobals<'r> {
    globals: HashMap<&'static str, Global<'r>>,
}

impl<'r> RenderGlobals<'r> {
    /// Creates an empty set of globals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callable under `name`, replacing any previous one.
    pub fn insert<F>(&mut self, name: &'static str, global: F)
    where
        F: FnMut() -> Result<CsrfToken> + 'r,
    {
        self.globals.insert(name, Box::new(global));
    }

    /// Whether a callable is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.globals.contains_key(name)
    }

    /// Invokes the callable registered under `name`.
    pub fn call(&mut self, name: &str) -> Option<Result<CsrfToken>> {
        self.globals.get_mut(name).map(|global| global())
    }
}

impl fmt::Debug for RenderGlobals<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.globals.keys()).finish()
    }
}

/// Injects the token getter into the render globals.
///
/// Nothing is added when the context has no active policy. The token is only
/// fetched (and possibly created) if the template actually calls it.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use csrf_core::render::{add_csrf_token_global, RenderGlobals, CSRF_TOKEN_GLOBAL};
/// use csrf_core::{CookieCsrf, RequestContext};
/// use csrf_core::web::RequestAdapter;
///
/// let request = RequestAdapter::new("req-1", "https", "example.com", 443);
/// let mut ctx = RequestContext::new(request).with_policy(Arc::new(CookieCsrf::default()));
///
/// let mut globals = RenderGlobals::new();
/// add_csrf_token_global(&mut globals, &mut ctx);
///
/// let token = globals.call(CSRF_TOKEN_GLOBAL).unwrap().unwrap();
/// assert!(!token.as_str().is_empty());
/// ```
pub fn add_csrf_token_global<'r, 's: 'r>(
    globals: &mut RenderGlobals<'r>,
    ctx: &'r mut RequestContext<'s>,
) {
    if ctx.policy().is_none() {
        return;
    }
    globals.insert(CSRF_TOKEN_GLOBAL, move || ctx.get_token());
}
