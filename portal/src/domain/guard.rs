//! Route guard state machine.
//!
//! [`authorize`] is the pure decision; [`RouteGuard`] wraps it with memory
//! of the previous verdict so navigation fires once per verdict change
//! rather than on every render. Views are rendered by the caller-supplied
//! closure only in the authorized state, so a protected view is never
//! produced for a session that may not see it.

use tokio::sync::watch;
use tracing::{debug, info};

use crate::domain::ports::Navigator;
use crate::domain::{AccessPolicy, Role, Route, SessionState};

/// Authorization requirement attached to a protected view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardPolicy {
    required_roles: Vec<Role>,
}

impl GuardPolicy {
    /// Any signed-in user may view.
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Only users holding one of `roles` may view. An empty list behaves
    /// like [`Self::authenticated`].
    pub fn require(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            required_roles: roles.into_iter().collect(),
        }
    }

    /// Roles accepted by this policy; empty means any signed-in user.
    pub fn required_roles(&self) -> &[Role] {
        &self.required_roles
    }
}

/// Guard verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardState {
    /// Session still loading; no decision yet.
    Resolving,
    /// Settled without a user.
    Unauthenticated,
    /// Signed in, but the role is not accepted.
    Forbidden,
    /// Signed in with an accepted role, or no role required.
    Authorized,
}

impl GuardState {
    /// Classify `session` against `policy`.
    pub fn evaluate(session: &SessionState, policy: &GuardPolicy) -> Self {
        if session.loading() {
            return Self::Resolving;
        }
        if !session.is_authenticated() {
            return Self::Unauthenticated;
        }
        let roles = policy.required_roles();
        if roles.is_empty() || AccessPolicy::for_session(session).has_any_role(roles) {
            Self::Authorized
        } else {
            Self::Forbidden
        }
    }

    /// Navigation owed for this verdict, if any.
    pub fn redirect(self) -> Option<Route> {
        match self {
            Self::Unauthenticated => Some(Route::SignIn),
            Self::Forbidden => Some(Route::Unauthorized),
            Self::Resolving | Self::Authorized => None,
        }
    }
}

/// What the composition layer should do for a protected view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Show a neutral loading indicator.
    ShowLoading,
    /// Render the wrapped view with its inputs unchanged.
    Render,
    /// Render nothing and navigate away.
    RedirectTo(Route),
}

/// Decide how to treat a protected view for the current session.
///
/// # Examples
/// ```
/// use portal::domain::{Decision, GuardPolicy, Route, SessionState, authorize};
///
/// let decision = authorize(&SessionState::signed_out(), &GuardPolicy::authenticated());
/// assert_eq!(decision, Decision::RedirectTo(Route::SignIn));
/// ```
pub fn authorize(session: &SessionState, policy: &GuardPolicy) -> Decision {
    let verdict = GuardState::evaluate(session, policy);
    match verdict.redirect() {
        Some(route) => Decision::RedirectTo(route),
        None if verdict == GuardState::Resolving => Decision::ShowLoading,
        None => Decision::Render,
    }
}

/// Output of a guarded render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered<V> {
    /// Loading indicator.
    Loading,
    /// Nothing; a redirect is pending.
    Nothing,
    /// The wrapped view's output.
    View(V),
}

impl<V> Rendered<V> {
    /// The view output, if the view was rendered.
    pub fn into_view(self) -> Option<V> {
        match self {
            Self::View(view) => Some(view),
            Self::Loading | Self::Nothing => None,
        }
    }
}

/// Stateful guard around one protected view.
#[derive(Debug)]
pub struct RouteGuard<N> {
    policy: GuardPolicy,
    navigator: N,
    verdict: Option<GuardState>,
}

impl<N: Navigator> RouteGuard<N> {
    /// Guard with no verdict observed yet.
    pub fn new(policy: GuardPolicy, navigator: N) -> Self {
        Self {
            policy,
            navigator,
            verdict: None,
        }
    }

    /// Last observed verdict.
    pub fn verdict(&self) -> Option<GuardState> {
        self.verdict
    }

    /// Render the view for `session`.
    ///
    /// `view` is invoked with `props` only when authorized. Navigation is
    /// issued after the output has been computed, and only when the verdict
    /// differs from the previous render.
    pub fn render<P, V>(
        &mut self,
        session: &SessionState,
        props: P,
        view: impl FnOnce(P) -> V,
    ) -> Rendered<V> {
        let verdict = GuardState::evaluate(session, &self.policy);
        let output = match verdict {
            GuardState::Resolving => Rendered::Loading,
            GuardState::Authorized => Rendered::View(view(props)),
            GuardState::Unauthenticated | GuardState::Forbidden => Rendered::Nothing,
        };
        self.observe(verdict);
        output
    }

    /// Wait until the session settles, then record and act on the verdict.
    ///
    /// Returns [`GuardState::Resolving`] only if the session service was
    /// dropped before settling.
    pub async fn settle(&mut self, receiver: &mut watch::Receiver<SessionState>) -> GuardState {
        let verdict = match receiver.wait_for(|state| !state.loading()).await {
            Ok(state) => GuardState::evaluate(&state, &self.policy),
            Err(_) => GuardState::Resolving,
        };
        self.observe(verdict);
        verdict
    }

    fn observe(&mut self, verdict: GuardState) {
        if self.verdict == Some(verdict) {
            return;
        }
        debug!(from = ?self.verdict, to = ?verdict, "route guard verdict changed");
        self.verdict = Some(verdict);
        if let Some(route) = verdict.redirect() {
            info!(route = %route, "route guard redirecting");
            self.navigator.navigate(route);
        }
    }
}

/// Inverse guard for the sign-in view: a signed-in user is sent to their
/// landing route instead of seeing the form again.
#[derive(Debug)]
pub struct SignInPageGuard<N> {
    navigator: N,
    redirected_to: Option<Route>,
}

impl<N: Navigator> SignInPageGuard<N> {
    /// Guard that has not redirected yet.
    pub fn new(navigator: N) -> Self {
        Self {
            navigator,
            redirected_to: None,
        }
    }

    /// Render the sign-in form for `session`.
    pub fn render<V>(&mut self, session: &SessionState, form: impl FnOnce() -> V) -> Rendered<V> {
        if session.loading() {
            return Rendered::Loading;
        }
        if !session.is_authenticated() {
            self.redirected_to = None;
            return Rendered::View(form());
        }
        let landing = AccessPolicy::for_session(session).default_redirect_path();
        if self.redirected_to != Some(landing) {
            info!(route = %landing, "already signed in; leaving sign-in page");
            self.redirected_to = Some(landing);
            self.navigator.navigate(landing);
        }
        Rendered::Nothing
    }
}
