//! `portal` entry-point: loads configuration, wires the HTTP adapters and
//! session store, then runs one command.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use color_eyre::eyre::{Context, Result};
use clap::Parser;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use portal::config::{PortalSettings, SettingsOverrides};
use portal::domain::{AuthService, SessionService};
use portal::inbound::cli::{Cli, Outcome, Portal};
use portal::outbound::http::{HttpApiGateway, HttpHealthProbe};

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let settings = PortalSettings::load_from_iter([OsString::from("portal")])
        .context("failed to load portal configuration")?
        .with_overrides(SettingsOverrides {
            api_base_url: cli.api_base_url,
            locale: cli.locale,
        });
    let base_url = settings.api_base_url()?;
    let locale = settings.locale();
    let store = settings.session_store();
    let gateway = HttpApiGateway::new(
        base_url.clone(),
        settings.request_timeout(),
        Arc::clone(&store),
        locale,
    )
    .context("failed to build HTTP client")?;
    let health = HttpHealthProbe::new(&base_url, settings.request_timeout(), locale)
        .context("failed to build health client")?;
    let portal = Portal::new(
        SessionService::new(AuthService::new(store, Arc::new(gateway))),
        Arc::new(health),
        settings.health_timeout(),
    );

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .context("create Tokio runtime")?;
    let mut stdout = io::stdout().lock();
    let outcome = runtime.block_on(portal.run(cli.command, &mut stdout))?;
    stdout.flush()?;
    Ok(match outcome {
        Outcome::Success => ExitCode::SUCCESS,
        Outcome::Failure => ExitCode::FAILURE,
    })
}

fn init_tracing(json: bool) {
    let builder = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}
