use anyhow::{Context, bail};
use clap::{ArgAction, Parser};
use crossterm::tty::IsTty;
use deploy_core::{AdvisoryClient, Config, RequestParameters, Settings};
use std::{
    ffi::OsString,
    io::{self, Write},
    process::ExitCode,
    sync::Arc,
};

use crate::{
    app::{Controller, UiState},
    render, tui,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "shouldideploy", version, about = "Should I deploy today?")]
pub struct Cli {
    /// Timezone to use, e.g. "Europe/Paris". Defaults to the configured one, then UTC.
    #[arg(long = "tz", value_name = "TIMEZONE")]
    pub timezone: Option<String>,

    /// Date to use; passed to the service as-is.
    #[arg(long)]
    pub date: Option<String>,

    /// Pick the timezone from a list before asking.
    #[arg(short, long)]
    pub interactive: bool,

    /// Print only the message, without colors or spinner.
    #[arg(long, conflicts_with = "interactive")]
    pub plain: bool,

    /// Save the timezone used as the default for future runs.
    #[arg(long)]
    pub remember: bool,

    /// Advisory service URL.
    #[arg(long, hide = true)]
    pub endpoint: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Accepts the single-dash spellings `-tz` and `-date` (also with `=value`)
/// by rewriting them to their `--` form.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut passthrough = false;

    args.into_iter()
        .map(|arg| {
            if passthrough {
                return arg;
            }

            let Some(text) = arg.to_str() else {
                return arg;
            };

            if text == "--" {
                passthrough = true;
                return arg;
            }

            for name in ["tz", "date"] {
                let Some(rest) = text.strip_prefix('-').and_then(|t| t.strip_prefix(name)) else {
                    continue;
                };
                if rest.is_empty() || rest.starts_with('=') {
                    return OsString::from(format!("--{name}{rest}"));
                }
            }

            arg
        })
        .collect()
}

impl Cli {
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Flags win over the config file.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(tz) = &self.timezone {
            settings.timezone = tz.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if self.plain {
            settings.plain = true;
        }
        if self.interactive {
            settings.plain = false;
        }
        settings
    }

    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let mut config = Config::load()?;
        let settings = self.apply(config.settings());
        tracing::debug!(?settings, "resolved settings");

        let has_tty = io::stdin().is_tty() && io::stdout().is_tty();
        let mode = output_mode(settings.plain, self.interactive, has_tty)?;

        let params = RequestParameters::new(settings.timezone.clone(), self.date.clone());
        let client = AdvisoryClient::new(settings.endpoint.clone());

        let (state, used) = match mode {
            OutputMode::Plain => {
                let state = match client.fetch(&params).await {
                    Ok(result) => UiState::Done(result),
                    Err(err) => UiState::Failed(err),
                };
                (state, params)
            }
            OutputMode::Terminal => {
                let controller = Controller::new(params, settings.timezones, self.interactive);
                let controller = tui::run(controller, Arc::new(client)).await?;

                let used = controller.params().clone();
                (controller.into_state(), used)
            }
        };

        if self.remember
            && let Some(timezone) = timezone_to_remember(&state, &used)
        {
            config.remember_timezone(timezone);
            config
                .save()
                .context("Failed to remember the timezone")?;
        }

        let status = report(
            &state,
            mode == OutputMode::Plain,
            &mut io::stdout().lock(),
            &mut io::stderr().lock(),
        )?;
        Ok(status.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Plain,
    Terminal,
}

/// The terminal UI needs a terminal on both stdin and stdout; without one the
/// answer is printed plainly, except that `-i` cannot work at all.
pub fn output_mode(plain: bool, interactive: bool, has_tty: bool) -> anyhow::Result<OutputMode> {
    if interactive && !has_tty {
        bail!("Interactive mode needs a terminal on stdin and stdout");
    }

    if plain || !has_tty {
        Ok(OutputMode::Plain)
    } else {
        Ok(OutputMode::Terminal)
    }
}

/// Only a timezone the service actually answered for is worth keeping.
fn timezone_to_remember<'a>(state: &UiState, used: &'a RequestParameters) -> Option<&'a str> {
    matches!(state, UiState::Done(_)).then_some(used.timezone.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => ExitCode::SUCCESS,
            Status::Failure => ExitCode::FAILURE,
        }
    }
}

/// Prints the outcome: the verdict to `out`, a failure to `err`. Quitting prints nothing.
fn report(
    state: &UiState,
    plain: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<Status> {
    let Some(text) = render::final_text(state, plain) else {
        return Ok(Status::Success);
    };

    match state {
        UiState::Failed(_) => {
            writeln!(err, "{text}")?;
            Ok(Status::Failure)
        }
        _ => {
            writeln!(out, "{text}")?;
            Ok(Status::Success)
        }
    }
}
