pub mod docker;
pub mod help;
pub mod kubernetes;
pub mod systemd;

use crate::capture;
use crate::collectors::{collect_resources, CommandRunner, ResourceSnapshot, Scope};
use crate::config::Config;
use crate::state::{DockerProject, KubernetesConfig, SystemdService};
use crate::store::StateStore;
use chrono::{DateTime, Utc};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use std::fmt;
use std::io;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainChoice {
    All,
    Docker,
    Kubernetes,
    Systemd,
    Capture,
    Help,
    Exit,
}

impl MainChoice {
    const ALL: [MainChoice; 7] = [
        MainChoice::All,
        MainChoice::Docker,
        MainChoice::Kubernetes,
        MainChoice::Systemd,
        MainChoice::Capture,
        MainChoice::Help,
        MainChoice::Exit,
    ];

    fn scope(self) -> Option<Scope> {
        match self {
            MainChoice::All => Some(Scope::All),
            MainChoice::Docker => Some(Scope::Docker),
            MainChoice::Kubernetes => Some(Scope::Kubernetes),
            MainChoice::Systemd => Some(Scope::Systemd),
            _ => None,
        }
    }
}

impl fmt::Display for MainChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MainChoice::All => "🔍 All Resource Types",
            MainChoice::Docker => "🐳 Docker Only",
            MainChoice::Kubernetes => "☸️ Kubernetes Only",
            MainChoice::Systemd => "⚙️ Systemd Only",
            MainChoice::Capture => "📊 Capture System State Only",
            MainChoice::Help => "❓ Help",
            MainChoice::Exit => "❌ Exit Application",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ResourceEntry<'a> {
    Back,
    Help,
    Docker(&'a DockerProject),
    Kubernetes(&'a KubernetesConfig),
    Systemd(&'a SystemdService),
}

impl fmt::Display for ResourceEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceEntry::Back => f.write_str("⬅️ Back to Main Menu"),
            ResourceEntry::Help => f.write_str("❓ Help"),
            ResourceEntry::Docker(p) => write!(
                f,
                "🐳 Docker: {} ({} container{})",
                p.name,
                p.containers,
                if p.containers == 1 { "" } else { "s" }
            ),
            ResourceEntry::Kubernetes(c) => write!(f, "☸️ Kubernetes: {} [{}]", c.name, c.status),
            ResourceEntry::Systemd(s) => write!(f, "⚙️ Systemd: {}", s.name),
        }
    }
}

pub(crate) fn resource_entries(snapshot: &ResourceSnapshot) -> Vec<ResourceEntry<'_>> {
    let mut entries = vec![ResourceEntry::Back, ResourceEntry::Help];
    entries.extend(snapshot.docker_projects.iter().map(ResourceEntry::Docker));
    entries.extend(snapshot.kubernetes_configs.iter().map(ResourceEntry::Kubernetes));
    entries.extend(
        snapshot
            .systemd_services
            .iter()
            .filter(|s| s.is_active())
            .map(ResourceEntry::Systemd),
    );
    entries
}

pub struct Menu<'a> {
    runner: &'a dyn CommandRunner,
    cfg: &'a Config,
    store: &'a StateStore,
    last_capture: Option<DateTime<Utc>>,
}

impl<'a> Menu<'a> {
    pub fn new(runner: &'a dyn CommandRunner, cfg: &'a Config, store: &'a StateStore) -> Self {
        let last_capture = if store.path().is_file() {
            match store.load() {
                Ok(state) => Some(state.last_updated),
                Err(err) => {
                    warn!(error = %err, "ignoring unreadable state file");
                    None
                }
            }
        } else {
            None
        };

        Self {
            runner,
            cfg,
            store,
            last_capture,
        }
    }

    pub fn run(&mut self) {
        loop {
            if let Some(at) = self.last_capture {
                println!(
                    "Last snapshot: {} ({} ago)",
                    at.format("%Y-%m-%d %H:%M:%S UTC"),
                    describe_age(at, Utc::now())
                );
            }

            let Some(index) = choose(
                "Select which types of resources to search for",
                &MainChoice::ALL,
            ) else {
                return;
            };

            let choice = MainChoice::ALL[index];
            match choice {
                MainChoice::Exit => {
                    println!("Exiting application. Goodbye!");
                    return;
                }
                MainChoice::Help => {
                    help::show(self.store.path());
                    pause_for_user();
                }
                MainChoice::Capture => {
                    println!("Capturing system state...");
                    match capture::capture_system_state(self.runner, self.cfg, self.store) {
                        Ok(state) => {
                            self.last_capture = Some(state.last_updated);
                            println!(
                                "System state captured and saved to {}",
                                self.store.path().display()
                            );
                        }
                        Err(err) => println!("{err}"),
                    }
                    pause_for_user();
                }
                _ => {
                    if let Some(scope) = choice.scope() {
                        self.browse(scope);
                    }
                }
            }
        }
    }

    fn browse(&mut self, scope: Scope) {
        println!("{}", searching_message(scope));
        let snapshot = collect_resources(self.runner, &self.cfg.tools, scope);
        for w in &snapshot.warnings {
            println!("Warning: {w}");
        }

        match capture::persist(self.store, snapshot.clone()) {
            Ok(state) => self.last_capture = Some(state.last_updated),
            Err(err) => println!("Warning: Failed to capture system state: {err}"),
        }

        self.resource_menu(&snapshot);
    }

    fn resource_menu(&self, snapshot: &ResourceSnapshot) {
        let entries = resource_entries(snapshot);
        if entries.len() <= 2 {
            println!("No resources found for the selected type(s).");
            return;
        }

        loop {
            let Some(index) = choose(
                "📋 Select a project, configuration, or service to view logs",
                &entries,
            ) else {
                return;
            };

            match entries[index] {
                ResourceEntry::Back => return,
                ResourceEntry::Help => help::show(self.store.path()),
                ResourceEntry::Docker(project) => docker::show(self.runner, self.cfg, project),
                ResourceEntry::Kubernetes(config) => {
                    kubernetes::show(self.runner, self.cfg, config)
                }
                ResourceEntry::Systemd(service) => systemd::show(self.runner, self.cfg, service),
            }
            pause_for_user();
        }
    }
}

fn searching_message(scope: Scope) -> &'static str {
    match scope {
        Scope::All => "Searching for all resource types...",
        Scope::Docker => "Searching for Docker resources...",
        Scope::Kubernetes => "Searching for Kubernetes resources...",
        Scope::Systemd => "Searching for Systemd resources...",
    }
}

pub(crate) fn choose<T: fmt::Display>(prompt: &str, entries: &[T]) -> Option<usize> {
    let theme = ColorfulTheme::default();
    match Select::with_theme(&theme)
        .with_prompt(prompt)
        .items(entries)
        .default(0)
        .interact_opt()
    {
        Ok(choice) => choice,
        Err(err) => {
            println!("Prompt failed: {err}");
            None
        }
    }
}

pub(crate) fn pause_for_user() {
    println!("\nPress Enter to continue...");
    let mut line = String::new();
    let _ = io::stdin().read_line(&mut line);
}

pub(crate) fn describe_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = now.signed_duration_since(then).num_seconds().max(0) as u64;
    humantime::format_duration(Duration::from_secs(secs)).to_string()
}
