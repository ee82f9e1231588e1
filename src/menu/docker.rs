use super::choose;
use crate::collectors::docker::{
    compose_unavailable, list_services, project_logs, resolve_compose, service_logs,
};
use crate::collectors::CommandRunner;
use crate::config::Config;
use crate::state::DockerProject;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ContainerEntry {
    AllContainers,
    Back,
    Service(String),
}

impl fmt::Display for ContainerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerEntry::AllContainers => f.write_str("🔄 All Containers"),
            ContainerEntry::Back => f.write_str("⬅️ Back"),
            ContainerEntry::Service(name) => f.write_str(name),
        }
    }
}

pub fn show(runner: &dyn CommandRunner, cfg: &Config, project: &DockerProject) {
    println!("Project {} ({})", project.name, project.path);

    let Some(compose) = resolve_compose(runner, &cfg.tools) else {
        println!("{}", compose_unavailable());
        return;
    };

    let services = match list_services(runner, &compose, &project.name) {
        Ok(services) => services,
        Err(err) => {
            println!("{err}");
            return;
        }
    };

    let mut entries = vec![ContainerEntry::AllContainers, ContainerEntry::Back];
    entries.extend(services.into_iter().map(ContainerEntry::Service));

    let prompt = format!(
        "🔍 Select a container in project '{}' to view logs",
        project.name
    );
    let Some(index) = choose(&prompt, &entries) else {
        return;
    };

    let logs = match &entries[index] {
        ContainerEntry::Back => return,
        ContainerEntry::AllContainers => project_logs(runner, &compose, &project.name),
        ContainerEntry::Service(service) => service_logs(runner, &compose, &project.name, service),
    };
    match logs {
        Ok(text) => println!("{text}"),
        Err(err) => println!("Error retrieving logs for project {}: {err}", project.name),
    }
}
