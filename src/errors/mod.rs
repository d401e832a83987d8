use crate::chart::ChartError;
use crate::manifest::ManifestError;
use crate::render::RenderError;
use crate::settings::SettingsError;
use crate::values::ValuesError;
use derivative::Derivative;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// ErrorMessageVerbosity: represents command error message's verbosity from minimal to full verbosity.
pub enum ErrorMessageVerbosity {
    SafeOnly,
    FullDetailsWithoutEnvVars,
    FullDetails,
}

/// CommandError: command error, mostly returned by third party tools.
#[derive(Derivative, Clone, Error, PartialEq)]
#[derivative(Debug)]
pub struct CommandError {
    /// full_details: full error message, can contains unsafe text such as secrets passed in values.
    full_details: Option<String>,
    /// message_safe: error message omitting displaying any protected data.
    message_safe: String,
    /// env_vars: environments variables given to the command, may carry credentials.
    #[derivative(Debug = "ignore")]
    env_vars: Option<Vec<(String, String)>>,
}

impl CommandError {
    /// Returns CommandError message_raw. May contains unsafe text.
    pub fn message_raw(&self) -> Option<String> {
        self.full_details.clone()
    }

    /// Returns CommandError message_safe omitting all unsafe text.
    pub fn message_safe(&self) -> String {
        self.message_safe.to_string()
    }

    /// Returns error message based on verbosity.
    pub fn message(&self, message_verbosity: ErrorMessageVerbosity) -> String {
        match message_verbosity {
            ErrorMessageVerbosity::SafeOnly => self.message_safe.to_string(),
            ErrorMessageVerbosity::FullDetailsWithoutEnvVars => match &self.full_details {
                None => self.message(ErrorMessageVerbosity::SafeOnly),
                Some(full_details) => format!("{} / Full details: {}", self.message_safe, full_details),
            },
            ErrorMessageVerbosity::FullDetails => match &self.full_details {
                None => self.message(ErrorMessageVerbosity::SafeOnly),
                Some(full_details) => match &self.env_vars {
                    None => format!("{} / Full details: {}", self.message_safe, full_details),
                    Some(env_vars) => format!(
                        "{} / Full details: {} / Env vars: {}",
                        self.message_safe,
                        full_details,
                        env_vars
                            .iter()
                            .map(|(k, v)| format!("{k}={v}"))
                            .collect::<Vec<String>>()
                            .join(" "),
                    ),
                },
            },
        }
    }

    /// Creates a new CommandError from safe message. To be used when message is safe.
    pub fn new_from_safe_message(message: String) -> Self {
        CommandError::new(message, None, None)
    }

    /// Creates a new CommandError having both a safe, an unsafe message and env vars.
    pub fn new(message_safe: String, message_raw: Option<String>, env_vars: Option<Vec<(String, String)>>) -> Self {
        CommandError {
            full_details: message_raw,
            message_safe,
            env_vars,
        }
    }

    /// Create a new CommandError from a CMD command.
    pub fn new_from_command_line(
        message: String,
        bin: String,
        cmd_args: Vec<String>,
        envs: Vec<(String, String)>,
        stdout: Option<String>,
        stderr: Option<String>,
    ) -> Self {
        let mut unsafe_message = format!("{}\ncommand: {} {}", message, bin, cmd_args.join(" "));

        if let Some(txt) = stdout {
            unsafe_message = format!("{unsafe_message}\nSTDOUT {txt}");
        }
        if let Some(txt) = stderr {
            unsafe_message = format!("{unsafe_message}\nSTDERR {txt}");
        }

        CommandError::new(message, Some(unsafe_message), Some(envs))
    }
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // expose safe message only
        f.write_str(self.message(ErrorMessageVerbosity::SafeOnly).as_str())
    }
}

/// VerifierError: any failure aborting a render verification.
#[derive(Error, Debug)]
pub enum VerifierError {
    #[error("Invalid verifier settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Invalid chart values: {0}")]
    Values(#[from] ValuesError),

    #[error("Invalid chart: {0}")]
    Chart(#[from] ChartError),

    #[error("Cannot render chart: {0}")]
    Render(RenderError),

    #[error("Cannot parse rendered manifest: {0}")]
    Manifest(#[from] ManifestError),
}

// values and chart failures are reported the same whichever renderer caught them
impl From<RenderError> for VerifierError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Values(err) => VerifierError::Values(err),
            RenderError::Chart(err) => VerifierError::Chart(err),
            err => VerifierError::Render(err),
        }
    }
}
