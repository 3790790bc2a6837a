use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, bail, Context, Result};
use gamever_core::{
    validate_version_name, ConfigStore, GameverError, Release, RepoCoordinates, GITHUB_API_ROOT,
};
use gamever_installer::{
    InstallEvent, InstallStage, InstalledVersion, LaunchPlan, VersionInstaller,
};
use gamever_remote::{build_client, ReleaseCatalog};
use gamever_sync::SelectionSnapshot;

use crate::completion::write_completions_script;
use crate::render::{highlight, OutputStyle, TerminalProgress, TerminalRenderer};
use crate::session::Session;
use crate::{Cli, Commands, ConfigCommands};

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    let renderer = TerminalRenderer::current();

    if let Commands::Completions { shell } = cli.command {
        let mut stdout = std::io::stdout().lock();
        return write_completions_script(shell, &mut stdout);
    }

    let config = match cli.config_dir.as_deref() {
        Some(dir) => ConfigStore::new(dir),
        None => ConfigStore::open_default().context("failed to resolve settings directory")?,
    };
    let api_root = cli
        .api_url
        .clone()
        .unwrap_or_else(|| GITHUB_API_ROOT.to_string());
    let coordinates = RepoCoordinates::default();

    if let Commands::Watch = cli.command {
        return run_watch(config, renderer);
    }

    let session = Session::open(config, renderer)?;
    let result = run_session_command(&session, cli.command, &api_root, &coordinates, renderer);
    session.close();
    result
}

fn run_session_command(
    session: &Session,
    command: Commands,
    api_root: &str,
    coordinates: &RepoCoordinates,
    renderer: TerminalRenderer,
) -> Result<()> {
    match command {
        Commands::Releases => {
            let client = build_client().context("failed to build HTTP client")?;
            let catalog = ReleaseCatalog::with_api_root(client, coordinates, api_root);
            let releases = fetch_releases(&catalog)?;
            let installed = session.store()?.installed_names()?;
            renderer.print_section("releases");
            renderer.print_lines(&format_release_lines(&releases, &installed));
        }
        Commands::Install { release, name } => {
            let client = build_client().context("failed to build HTTP client")?;
            let catalog = ReleaseCatalog::with_api_root(client.clone(), coordinates, api_root);
            let releases = fetch_releases(&catalog)?;
            let release = find_release(&releases, &release)?;
            let destination = name.unwrap_or_else(|| release.display_name.clone());
            run_install(
                session,
                VersionInstaller::new(client, coordinates),
                release,
                &destination,
                renderer,
            )?;
        }
        Commands::List { all } => {
            let store = session.store()?;
            let installed = store
                .list_installed()
                .context("failed to list installed versions")?;
            let selected = session.config().selected_version()?;
            renderer.print_section("installed versions");
            renderer.print_lines(&format_installed_lines(
                &installed,
                &selected,
                renderer.style(),
            ));
            if all {
                let incomplete = store
                    .list_incomplete()
                    .context("failed to list incomplete installs")?;
                renderer.print_lines(&format_incomplete_lines(&incomplete));
            }
        }
        Commands::Select { name } => {
            validate_version_name(&name)?;
            let installed = session.store()?.installed_names()?;
            if !installed.contains(&name) {
                return Err(GameverError::not_found("installed version", name.as_str()))
                    .with_context(|| format!("cannot select '{name}'"));
            }
            session.config().set_selected_version(&name)?;
            renderer.print_status("ok", &format!("selected {name}"));
        }
        Commands::Rename { old, new } => {
            // Read before renaming; the reconciler may re-point a vanished selection meanwhile.
            let was_selected = session.config().selected_version()? == old;
            session
                .store()?
                .rename(&old, &new)
                .with_context(|| format!("failed to rename '{old}' to '{new}'"))?;
            if was_selected {
                session.config().set_selected_version(&new)?;
            }
            renderer.print_status("ok", &format!("renamed {old} to {new}"));
        }
        Commands::Delete { name, yes } => {
            if !yes {
                bail!(
                    "refusing to delete '{name}' without --yes; \
                     this removes the whole version directory"
                );
            }
            session
                .store()?
                .delete(&name)
                .with_context(|| format!("failed to delete '{name}'"))?;
            renderer.print_status("ok", &format!("deleted {name}"));
        }
        Commands::Launch { mode, argument } => {
            let selected = session.config().selected_version()?;
            let plan = LaunchPlan::resolve(
                &session.store()?,
                &selected,
                mode.as_deref(),
                argument.as_deref(),
            )
            .context("failed to prepare launch")?;
            run_launch(&plan, renderer)?;
        }
        Commands::Config { command } => run_config_command(session.config(), command, renderer)?,
        Commands::Watch | Commands::Completions { .. } => {
            return Err(anyhow!("command must be handled outside a session"));
        }
    }

    Ok(())
}

fn fetch_releases(catalog: &ReleaseCatalog) -> Result<Vec<Release>> {
    catalog
        .list_releases()
        .with_context(|| format!("failed to fetch releases from {}", catalog.url()))
}

fn find_release<'a>(releases: &'a [Release], name: &str) -> Result<&'a Release> {
    releases
        .iter()
        .find(|release| release.display_name == name)
        .ok_or_else(|| anyhow!("release '{name}' not found; run `gamever releases` to list them"))
}

fn run_install(
    session: &Session,
    installer: VersionInstaller,
    release: &Release,
    destination: &str,
    renderer: TerminalRenderer,
) -> Result<()> {
    validate_version_name(destination)?;
    let store = session.store()?;
    if store.contains(destination) {
        return Err(GameverError::Conflict(destination.to_string())).with_context(|| {
            format!("choose another name with --name or delete '{destination}' first")
        });
    }

    let mut transfer: Option<TerminalProgress> = None;
    let result =
        installer.install_with_progress(release, destination, store.layout(), |event| match event {
            InstallEvent::Stage(stage) => {
                if let Some(progress) = transfer.take() {
                    progress.finish_success();
                }
                renderer.print_status("step", &describe_stage(stage));
            }
            InstallEvent::Transfer {
                label,
                downloaded,
                total,
            } => {
                transfer
                    .get_or_insert_with(|| renderer.start_transfer(label))
                    .set(downloaded, total);
            }
        });
    if let Some(progress) = transfer.take() {
        progress.finish_abandon();
    }

    let version_dir = result.with_context(|| {
        format!(
            "failed to install release '{}' as '{destination}'; partial files remain in {} \
             (remove them with `gamever delete {destination} --yes`)",
            release.display_name,
            store.layout().version_dir(destination).display()
        )
    })?;
    renderer.print_status(
        "ok",
        &format!(
            "installed {} as {destination} in {}",
            release.display_name,
            version_dir.display()
        ),
    );
    if !store.locate_executable(destination).is_file() {
        renderer.print_status(
            "warn",
            "this version ships without a prebuilt game binary; run `go build main.go` in its source folder",
        );
    }
    Ok(())
}

fn describe_stage(stage: InstallStage<'_>) -> String {
    match stage {
        InstallStage::DownloadArchive => "downloading source archive".to_string(),
        InstallStage::Extract => "extracting source archive".to_string(),
        InstallStage::DownloadAsset(name) => format!("downloading asset {name}"),
        InstallStage::Finalize => "writing version metadata".to_string(),
    }
}

fn run_launch(plan: &LaunchPlan, renderer: TerminalRenderer) -> Result<()> {
    renderer.print_status(
        "step",
        &format!(
            "launching {} ({}, {}: {})",
            plan.version, plan.mode, plan.argument_label, plan.argument
        ),
    );
    let status = Command::new(&plan.executable)
        .args(plan.args())
        .current_dir(&plan.working_dir)
        .status()
        .with_context(|| format!("failed to start {}", plan.executable.display()))?;
    if !status.success() {
        bail!("game exited with {status}");
    }
    Ok(())
}

fn run_config_command(
    config: &ConfigStore,
    command: ConfigCommands,
    renderer: TerminalRenderer,
) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let current = config.load()?;
            renderer.print_lines(&format_config_lines(
                &config.config_path(),
                &current.download_dir,
                &current.selected_version,
            ));
        }
        ConfigCommands::SetDownloadDir { path } => {
            let resolved = config
                .set_download_dir(&path)
                .with_context(|| format!("failed to use {} for downloads", path.display()))?;
            renderer.print_status(
                "ok",
                &format!("download directory set to {}", resolved.display()),
            );
        }
        ConfigCommands::ResetDownloadDir => {
            let dir = config.reset_download_dir()?;
            renderer.print_status(
                "ok",
                &format!("download directory reset to {}", dir.display()),
            );
        }
    }
    Ok(())
}

fn run_watch(config: ConfigStore, renderer: TerminalRenderer) -> Result<()> {
    let style = renderer.style();
    let observer = move |snapshot: &SelectionSnapshot| {
        println!("{}", format_snapshot_line(snapshot, style));
    };
    let session = Session::open_with_observer(config, renderer, observer)?;
    renderer.print_status("info", "watching selection; press Enter to stop");

    let mut line = String::new();
    let read = std::io::stdin().read_line(&mut line);
    session.close();
    read.context("failed reading from stdin")?;
    Ok(())
}

pub(crate) fn format_release_lines(releases: &[Release], installed: &[String]) -> Vec<String> {
    if releases.is_empty() {
        return vec!["no releases published".to_string()];
    }

    releases
        .iter()
        .map(|release| {
            let assets = match release.assets.len() {
                1 => "1 asset".to_string(),
                count => format!("{count} assets"),
            };
            let marker = if installed.contains(&release.display_name) {
                " [installed]"
            } else {
                ""
            };
            format!("{} ({assets}){marker}", release.display_name)
        })
        .collect()
}

pub(crate) fn format_installed_lines(
    installed: &[InstalledVersion],
    selected: &str,
    style: OutputStyle,
) -> Vec<String> {
    if installed.is_empty() {
        return vec!["no versions installed".to_string()];
    }

    installed
        .iter()
        .map(|version| {
            let recorded = if version.metadata_version != version.name {
                format!(" (installed as {})", version.metadata_version)
            } else {
                String::new()
            };
            if version.name == selected {
                format!("* {}{recorded}", highlight(style, &version.name))
            } else {
                format!("  {}{recorded}", version.name)
            }
        })
        .collect()
}

pub(crate) fn format_incomplete_lines(incomplete: &[String]) -> Vec<String> {
    incomplete
        .iter()
        .map(|name| format!("  {name} (incomplete)"))
        .collect()
}

pub(crate) fn format_config_lines(
    config_path: &Path,
    download_dir: &Path,
    selected: &str,
) -> Vec<String> {
    let selected = if selected.is_empty() { "<none>" } else { selected };
    vec![
        format!("config: {}", config_path.display()),
        format!("download_dir: {}", download_dir.display()),
        format!("version: {selected}"),
    ]
}

pub(crate) fn format_snapshot_line(snapshot: &SelectionSnapshot, style: OutputStyle) -> String {
    if snapshot.installed.is_empty() {
        return "selected: <none> (nothing installed)".to_string();
    }
    format!(
        "selected: {} (installed: {})",
        highlight(style, &snapshot.selected),
        snapshot.installed.join(", ")
    )
}
