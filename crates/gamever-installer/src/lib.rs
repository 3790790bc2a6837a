mod extract;
mod fs_utils;
mod install;
mod launch;
mod layout;
mod store;

pub use extract::{extract_zip, flatten_wrapper_dirs};
pub use fs_utils::remove_file_if_exists;
pub use install::{InstallEvent, InstallStage, VersionInstaller};
pub use launch::LaunchPlan;
pub use layout::{VersionLayout, EXECUTABLE_NAME, SOURCE_DIR_NAME};
pub use store::{InstalledVersion, VersionStore};
