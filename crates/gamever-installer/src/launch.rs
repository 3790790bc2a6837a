use std::path::PathBuf;

use gamever_core::{validate_version_name, GameverError, LaunchDescriptor, Result};

use crate::store::VersionStore;

/// Everything the process launcher needs: `<executable> <mode> <argument>` run in `working_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub version: String,
    pub executable: PathBuf,
    pub working_dir: PathBuf,
    pub mode: String,
    pub argument: String,
    /// Human label of the argument slot, e.g. `Port` for `host`.
    pub argument_label: String,
}

impl LaunchPlan {
    pub fn resolve(
        store: &VersionStore,
        version: &str,
        mode: Option<&str>,
        argument: Option<&str>,
    ) -> Result<Self> {
        if version.is_empty() {
            return Err(GameverError::not_found("selected version", "<none>"));
        }
        validate_version_name(version)?;

        let executable = store.locate_executable(version);
        if !executable.is_file() {
            return Err(GameverError::not_found(
                "game executable (this version may ship without a prebuilt binary)",
                executable.display().to_string(),
            ));
        }

        let working_dir = store.layout().source_dir(version);
        let descriptor_path = store.layout().descriptor_path(version);
        let descriptor = LaunchDescriptor::load_or_builtin(&descriptor_path)?;
        let mode_name = match mode {
            Some(mode) => mode.to_string(),
            None => descriptor
                .default_mode_name()
                .ok_or_else(|| GameverError::not_found("launch mode", "<default>"))?
                .to_string(),
        };
        let launch_mode = descriptor.mode(&mode_name).ok_or_else(|| {
            GameverError::not_found(
                "launch mode",
                format!(
                    "{mode_name} (available: {})",
                    descriptor.mode_names().join(", ")
                ),
            )
        })?;
        let primary = launch_mode.primary_argument();
        let argument = match argument {
            Some(argument) => argument.to_string(),
            None => primary.map(|arg| arg.default.clone()).unwrap_or_default(),
        };
        let argument_label = primary
            .map(|arg| arg.display_label().to_string())
            .unwrap_or_else(|| "argument".to_string());

        Ok(Self {
            version: version.to_string(),
            executable,
            working_dir,
            mode: mode_name,
            argument,
            argument_label,
        })
    }

    pub fn args(&self) -> [&str; 2] {
        [self.mode.as_str(), self.argument.as_str()]
    }
}
