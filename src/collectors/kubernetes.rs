use super::{run_checked, run_combined, CollectError, CollectWarning, Collected, CommandRunner, Source};
use crate::config::ToolsConfig;
use crate::state::{ContextStatus, KubernetesConfig, KubernetesDeployment, KubernetesNamespace};
use serde::Deserialize;
use tracing::debug;

const NODES_PLACEHOLDER: &str = "N/A";

pub fn collect_configs(runner: &dyn CommandRunner, tools: &ToolsConfig) -> Collected<KubernetesConfig> {
    let kubectl = tools.kubectl.as_str();
    let mut warnings = Vec::new();

    let current = match current_context(runner, kubectl) {
        Ok(current) => Some(current),
        Err(err @ CollectError::NotInstalled { .. }) => {
            return Collected::unavailable(Source::Kubernetes, &err);
        }
        Err(err) => {
            warnings.push(CollectWarning::new(Source::Kubernetes, "current-context", &err));
            None
        }
    };

    let contexts = match list_contexts(runner, kubectl) {
        Ok(contexts) => contexts,
        Err(err) => {
            warnings.push(CollectWarning::new(Source::Kubernetes, "contexts", &err));
            return Collected {
                items: Vec::new(),
                warnings,
            };
        }
    };

    let mut configs = Vec::with_capacity(contexts.len());
    for context in contexts {
        let status = if current.as_deref() == Some(context.as_str()) {
            ContextStatus::Active
        } else {
            ContextStatus::Configured
        };

        let namespaces = match list_namespaces(runner, kubectl, &context) {
            Ok(names) => names
                .into_iter()
                .map(|namespace| {
                    let deployments = match list_deployments(runner, kubectl, &context, &namespace) {
                        Ok(deployments) => deployments,
                        Err(err) => {
                            warnings.push(CollectWarning::new(
                                Source::Kubernetes,
                                format!("{context}/{namespace}"),
                                &err,
                            ));
                            Vec::new()
                        }
                    };
                    KubernetesNamespace {
                        name: namespace,
                        deployments,
                    }
                })
                .collect(),
            Err(err) => {
                warnings.push(CollectWarning::new(Source::Kubernetes, context.clone(), &err));
                Vec::new()
            }
        };

        configs.push(KubernetesConfig {
            name: context,
            status,
            nodes: NODES_PLACEHOLDER.to_string(),
            namespaces,
        });
    }

    debug!(contexts = configs.len(), "kubernetes contexts collected");
    Collected {
        items: configs,
        warnings,
    }
}

pub fn current_context(runner: &dyn CommandRunner, kubectl: &str) -> Result<String, CollectError> {
    let stdout = run_checked(runner, kubectl, &["config", "current-context"])?;
    Ok(stdout.trim().to_string())
}

pub fn list_contexts(runner: &dyn CommandRunner, kubectl: &str) -> Result<Vec<String>, CollectError> {
    let stdout = run_checked(runner, kubectl, &["config", "get-contexts", "-o", "name"])?;
    Ok(stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn list_namespaces(
    runner: &dyn CommandRunner,
    kubectl: &str,
    context: &str,
) -> Result<Vec<String>, CollectError> {
    let stdout = run_checked(
        runner,
        kubectl,
        &[
            "get",
            "namespaces",
            "--context",
            context,
            "-o",
            "jsonpath={.items[*].metadata.name}",
        ],
    )?;
    Ok(stdout.split_whitespace().map(str::to_string).collect())
}

pub fn list_deployments(
    runner: &dyn CommandRunner,
    kubectl: &str,
    context: &str,
    namespace: &str,
) -> Result<Vec<KubernetesDeployment>, CollectError> {
    let stdout = run_checked(
        runner,
        kubectl,
        &["get", "deployments", "-n", namespace, "--context", context, "-o", "json"],
    )?;
    parse_deployments(&stdout)
}

#[derive(Debug, Deserialize)]
struct DeploymentList {
    #[serde(default)]
    items: Vec<DeploymentItem>,
}

#[derive(Debug, Deserialize)]
struct DeploymentItem {
    metadata: ObjectMeta,
    #[serde(default)]
    spec: DeploymentSpec,
    #[serde(default)]
    status: DeploymentStatus,
}

#[derive(Debug, Deserialize)]
struct ObjectMeta {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct DeploymentSpec {
    #[serde(default)]
    replicas: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeploymentStatus {
    #[serde(default)]
    ready_replicas: i32,
}

pub fn parse_deployments(json: &str) -> Result<Vec<KubernetesDeployment>, CollectError> {
    let list: DeploymentList = serde_json::from_str(json).map_err(|source| CollectError::Json {
        what: "deployment list".to_string(),
        source,
    })?;
    Ok(list
        .items
        .into_iter()
        .map(|item| KubernetesDeployment::new(item.metadata.name, item.spec.replicas, item.status.ready_replicas))
        .collect())
}

pub fn deployment_logs(
    runner: &dyn CommandRunner,
    tools: &ToolsConfig,
    context: &str,
    namespace: &str,
    deployment: &str,
) -> Result<String, CollectError> {
    let target = format!("deployment/{deployment}");
    run_combined(
        runner,
        &tools.kubectl,
        &["logs", target.as_str(), "-n", namespace, "--context", context],
    )
}
