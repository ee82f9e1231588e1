use super::choose;
use crate::collectors::kubernetes::deployment_logs;
use crate::collectors::CommandRunner;
use crate::config::Config;
use crate::state::{KubernetesConfig, KubernetesDeployment};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
enum DeploymentEntry<'a> {
    Back,
    Deployment {
        namespace: &'a str,
        deployment: &'a KubernetesDeployment,
    },
}

impl fmt::Display for DeploymentEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentEntry::Back => f.write_str("⬅️ Back"),
            DeploymentEntry::Deployment {
                namespace,
                deployment,
            } => write!(f, "{namespace}/{} ({})", deployment.name, deployment.status),
        }
    }
}

fn deployment_entries(config: &KubernetesConfig) -> Vec<DeploymentEntry<'_>> {
    let mut entries = vec![DeploymentEntry::Back];
    for ns in &config.namespaces {
        let namespace = ns.name.as_str();
        entries.extend(
            ns.deployments
                .iter()
                .map(move |deployment| DeploymentEntry::Deployment {
                    namespace,
                    deployment,
                }),
        );
    }
    entries
}

pub fn show(runner: &dyn CommandRunner, cfg: &Config, config: &KubernetesConfig) {
    let entries = deployment_entries(config);
    if entries.len() == 1 {
        println!("No deployments found in context {}", config.name);
        return;
    }

    let prompt = format!(
        "🔍 Select a deployment in context '{}' to view logs",
        config.name
    );
    let Some(index) = choose(&prompt, &entries) else {
        return;
    };

    let DeploymentEntry::Deployment {
        namespace,
        deployment,
    } = entries[index]
    else {
        return;
    };

    match deployment_logs(runner, &cfg.tools, &config.name, namespace, &deployment.name) {
        Ok(text) => println!("{text}"),
        Err(err) => println!(
            "Error retrieving logs for deployment {} in namespace {namespace} and context {}: {err}",
            deployment.name, config.name
        ),
    }
}
