use std::fs;
use std::path::{Path, PathBuf};

use crate::cmd::command::{
    CommandError as ExecError, CommandKiller, ExecCommand, command_to_string, does_binary_exist, run_version_command_for,
};
use crate::errors::CommandError;
use crate::helm::{ChartInfo, ChartSetValue};
use tempfile::TempDir;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum HelmError {
    #[error("Helm binary `{0}` cannot be executed")]
    BinaryNotFound(String),

    #[error("Helm command `{0}` failed: {1}")]
    CmdError(String, CommandError),

    #[error("Helm command `{0}` timed out: {1}")]
    Timeout(String, CommandError),

    #[error("Cannot write generated values file `{0}`: {1}")]
    CannotWriteValuesFile(String, String),
}

/// Thin wrapper around the `helm` binary.
pub struct Helm {
    binary: PathBuf,
}

impl Helm {
    pub fn new<P: AsRef<Path>>(binary: P) -> Helm {
        Helm {
            binary: binary.as_ref().to_path_buf(),
        }
    }

    /// Output of `helm version`, empty when helm cannot be run.
    pub fn version(&self) -> String {
        run_version_command_for(&self.binary.to_string_lossy(), "version")
    }

    /// Runs `helm template` and returns the rendered manifest stream.
    pub fn template(&self, chart: &ChartInfo, cmd_killer: &CommandKiller) -> Result<String, HelmError> {
        if !does_binary_exist(&self.binary) {
            return Err(HelmError::BinaryNotFound(self.binary.display().to_string()));
        }

        // generated values files must outlive the command
        let values_dir = TempDir::new().map_err(|e| HelmError::CannotWriteValuesFile("tempdir".to_string(), e.to_string()))?;
        let mut generated_files = Vec::with_capacity(chart.yaml_files_content.len());
        for generated in &chart.yaml_files_content {
            let file_path = values_dir.path().join(&generated.filename);
            fs::write(&file_path, &generated.yaml_content)
                .map_err(|e| HelmError::CannotWriteValuesFile(generated.filename.clone(), e.to_string()))?;
            generated_files.push(file_path);
        }

        let args = template_args(chart, &generated_files);
        let args_str: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut cmd = ExecCommand::new(&self.binary, &args_str, &[]);
        info!(
            "exec helm template for release {} and chart {}",
            chart.release_name,
            chart.path.display()
        );
        let ret = cmd.exec_with_abort(
            &mut |line| {
                stdout.push_str(&line);
                stdout.push('\n');
            },
            &mut |line| {
                warn!("{}", line);
                stderr.push_str(&line);
                stderr.push('\n');
            },
            cmd_killer,
        );

        let command_line = command_to_string(&self.binary, &args_str, &[]);
        match ret {
            Ok(()) => Ok(stdout),
            Err(ExecError::TimeoutError(msg)) => Err(HelmError::Timeout(
                command_line,
                CommandError::new_from_safe_message(msg),
            )),
            Err(err) => {
                let safe_message = format!("Helm template failed: {err}");
                Err(HelmError::CmdError(
                    command_line,
                    CommandError::new_from_command_line(
                        safe_message,
                        self.binary.display().to_string(),
                        args,
                        vec![],
                        None,
                        Some(stderr),
                    ),
                ))
            }
        }
    }
}

pub fn template_args(chart: &ChartInfo, generated_values_files: &[PathBuf]) -> Vec<String> {
    let mut args = vec![
        "template".to_string(),
        chart.release_name.clone(),
        chart.path.display().to_string(),
        "--namespace".to_string(),
        chart.namespace.clone(),
    ];

    for template in &chart.show_only {
        args.push("--show-only".to_string());
        args.push(template.clone());
    }

    for file in chart.values_files.iter().chain(generated_values_files) {
        args.push("-f".to_string());
        args.push(file.display().to_string());
    }

    for ChartSetValue { key, value } in &chart.values {
        args.push("--set".to_string());
        args.push(format!("{key}={}", escape_set_value(value)));
    }

    for ChartSetValue { key, value } in &chart.values_string {
        args.push("--set-string".to_string());
        args.push(format!("{key}={}", escape_set_value(value)));
    }

    args
}

// helm splits `--set` on commas, a value has to escape them
fn escape_set_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace(',', "\\,")
}
