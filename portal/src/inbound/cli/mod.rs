//! Terminal client for the grading portal.
//!
//! This is the view-composition layer: it hydrates the session, runs each
//! command through the route guards, and writes plain text to the supplied
//! writer. The binary delegates here so commands can be exercised in tests
//! without spawning a process.

pub mod views;

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;

use self::views::{Access, View};
use crate::domain::ports::{
    ApiGateway, HealthProbe, HttpMethod, RecordingNavigator, RequestOptions, SessionStore,
};
use crate::domain::{
    AccessPolicy, GuardPolicy, Rendered, RouteGuard, SessionService, SessionState,
    SignInPageGuard,
};

/// `portal` command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "portal",
    about = "Terminal client for the CScore grading portal",
    version
)]
pub struct Cli {
    /// Emit logs on stderr as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,
    /// Backend base address; overrides `PORTAL_API_BASE_URL` and the file.
    #[arg(long, global = true)]
    pub api_base_url: Option<String>,
    /// Message locale (`vi` or `en`); overrides `PORTAL_LOCALE` and the file.
    #[arg(long, global = true)]
    pub locale: Option<String>,
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sign in and store the session.
    Login {
        /// Username or email.
        identifier: String,
        /// Password; read from `PORTAL_PASSWORD` when the flag is omitted.
        #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Clear the stored session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Open a view through its route guard.
    Open {
        /// View path, for example `/teacher/courses`.
        path: String,
    },
    /// Check backend health.
    Health {
        /// Only report reachability, bounded by the quick timeout.
        #[arg(long)]
        quick: bool,
    },
    /// Send a raw request through the gateway.
    Request {
        /// HTTP method.
        method: HttpMethod,
        /// Endpoint path, for example `/api/student/courses`.
        endpoint: String,
        /// JSON request body.
        #[arg(long)]
        body: Option<String>,
    },
}

/// How a command finished, mapped to the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command did what was asked.
    Success,
    /// The command ran but was refused, redirected, or failed remotely.
    Failure,
}

/// Errors that abort a command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
    /// A value could not be encoded for display.
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
    /// The `--body` value was not JSON.
    #[error("request body is not valid JSON: {message}")]
    InvalidBody {
        /// Parser diagnostic.
        message: String,
    },
}

/// Command runner wired to a session service and a health probe.
pub struct Portal<S: ?Sized, G: ?Sized> {
    session: SessionService<S, G>,
    health: Arc<dyn HealthProbe>,
    quick_timeout: Duration,
}

impl<S, G> Portal<S, G>
where
    S: SessionStore + ?Sized,
    G: ApiGateway + ?Sized,
{
    /// Runner over `session` and `health`; `quick_timeout` bounds
    /// `health --quick`.
    pub fn new(
        session: SessionService<S, G>,
        health: Arc<dyn HealthProbe>,
        quick_timeout: Duration,
    ) -> Self {
        Self {
            session,
            health,
            quick_timeout,
        }
    }

    /// Session service driving the runner.
    pub fn session(&self) -> &SessionService<S, G> {
        &self.session
    }

    /// Hydrate the session and run `command`, writing to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] when output cannot be written or the request body
    /// is invalid. Remote failures are reported in the output and yield
    /// [`Outcome::Failure`].
    pub async fn run<W: Write>(&self, command: Command, out: &mut W) -> Result<Outcome, CliError> {
        self.session.init();
        match command {
            Command::Login {
                identifier,
                password,
            } => self.login(&identifier, &password, out).await,
            Command::Logout => self.logout(out),
            Command::Whoami => self.whoami(out),
            Command::Open { path } => self.open(&path, out),
            Command::Health { quick } => self.health(quick, out).await,
            Command::Request {
                method,
                endpoint,
                body,
            } => self.request(method, &endpoint, body.as_deref(), out).await,
        }
    }

    async fn login<W: Write>(
        &self,
        identifier: &str,
        password: &str,
        out: &mut W,
    ) -> Result<Outcome, CliError> {
        let navigator = RecordingNavigator::new();
        let mut page = SignInPageGuard::new(&navigator);
        let state = self.session.state();
        if matches!(page.render(&state, || ()), Rendered::Nothing) {
            writeln!(
                out,
                "already signed in as {}",
                AccessPolicy::for_session(&state).display_name()
            )?;
            write_redirect(out, &navigator)?;
            return Ok(Outcome::Success);
        }

        if self.session.sign_in(identifier, password).await.is_err() {
            let locale = self.session.locale();
            let state = self.session.state();
            writeln!(out, "{}", state.error().unwrap_or_else(|| locale.sign_in_failed()))?;
            return Ok(Outcome::Failure);
        }

        let state = self.session.state();
        let policy = AccessPolicy::for_session(&state);
        writeln!(
            out,
            "signed in as {} ({})",
            policy.display_name(),
            policy.display_label(None, self.session.locale())
        )?;
        page.render(&state, || ());
        write_redirect(out, &navigator)?;
        Ok(Outcome::Success)
    }

    fn logout<W: Write>(&self, out: &mut W) -> Result<Outcome, CliError> {
        self.session.sign_out();
        writeln!(out, "signed out")?;
        Ok(Outcome::Success)
    }

    fn whoami<W: Write>(&self, out: &mut W) -> Result<Outcome, CliError> {
        let state = self.session.state();
        let Some(user) = state.user() else {
            writeln!(out, "not signed in")?;
            return Ok(Outcome::Failure);
        };
        let policy = AccessPolicy::for_session(&state);
        writeln!(out, "name: {}", policy.display_name())?;
        writeln!(out, "username: {}", user.username())?;
        writeln!(out, "email: {}", user.email())?;
        if let Some(student_id) = user.student_id() {
            writeln!(out, "student id: {student_id}")?;
        }
        writeln!(
            out,
            "role: {}",
            policy.display_label(None, self.session.locale())
        )?;
        writeln!(out, "landing: {}", policy.default_redirect_path())?;
        Ok(Outcome::Success)
    }

    fn open<W: Write>(&self, path: &str, out: &mut W) -> Result<Outcome, CliError> {
        let Some(view) = views::resolve(path) else {
            writeln!(out, "no view at {path}")?;
            return Ok(Outcome::Failure);
        };
        let state = self.session.state();
        let navigator = RecordingNavigator::new();
        let rendered = match view.access {
            Access::Public => Rendered::View(self.render_view(view, &state)),
            Access::SignInPage => {
                SignInPageGuard::new(&navigator).render(&state, || self.render_view(view, &state))
            }
            Access::Guarded(roles) => {
                let policy = GuardPolicy::require(roles.iter().copied());
                RouteGuard::new(policy, &navigator)
                    .render(&state, view, |view| self.render_view(view, &state))
            }
        };

        match rendered {
            Rendered::View(text) => {
                out.write_all(text.as_bytes())?;
                Ok(Outcome::Success)
            }
            Rendered::Loading => {
                writeln!(out, "loading")?;
                Ok(Outcome::Failure)
            }
            Rendered::Nothing => {
                write_redirect(out, &navigator)?;
                Ok(Outcome::Failure)
            }
        }
    }

    async fn health<W: Write>(&self, quick: bool, out: &mut W) -> Result<Outcome, CliError> {
        if quick {
            let healthy = self.health.quick_check(self.quick_timeout).await;
            writeln!(out, "{}", if healthy { "healthy" } else { "unreachable" })?;
            return Ok(outcome(healthy));
        }
        let report = self.health.check_health().await;
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        Ok(outcome(report.is_healthy))
    }

    async fn request<W: Write>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&str>,
        out: &mut W,
    ) -> Result<Outcome, CliError> {
        let mut options = RequestOptions::new(method);
        if let Some(raw) = body {
            let value: Value =
                serde_json::from_str(raw).map_err(|error| CliError::InvalidBody {
                    message: error.to_string(),
                })?;
            options = options.with_body(value);
        }

        match self.session.auth().gateway().request(endpoint, options).await {
            Ok(value) => {
                writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
                Ok(Outcome::Success)
            }
            Err(error) => {
                if self.session.react_to(&error) {
                    info!(endpoint, "session cleared after expiry");
                    writeln!(out, "session expired; signed out")?;
                }
                writeln!(out, "error ({}): {}", error.kind(), error.message())?;
                Ok(Outcome::Failure)
            }
        }
    }

    fn render_view(&self, view: &View, state: &SessionState) -> String {
        let policy = AccessPolicy::for_session(state);
        let mut text = format!("# {}\n", view.title);
        if state.is_authenticated() {
            text.push_str(&format!(
                "signed in as {} ({})\n",
                policy.display_name(),
                policy.display_label(None, self.session.locale())
            ));
        }
        text
    }
}

fn outcome(success: bool) -> Outcome {
    if success {
        Outcome::Success
    } else {
        Outcome::Failure
    }
}

fn write_redirect<W: Write>(out: &mut W, navigator: &RecordingNavigator) -> io::Result<()> {
    match navigator.last() {
        Some(route) => writeln!(out, "redirect: {route}"),
        None => Ok(()),
    }
}
