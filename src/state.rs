use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

pub const COMPOSE_PROJECT_LABEL: &str = "com.docker.compose.project";
pub const COMPOSE_WORKING_DIR_LABEL: &str = "com.docker.compose.project.working_dir";

/// Root of the persisted snapshot. Nested records use PascalCase field names
/// so files written by older releases keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemState {
    #[serde(
        rename = "docker_compose_projects",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub docker_projects: Vec<DockerProject>,
    #[serde(
        rename = "kubernetes_projects",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub kubernetes_configs: Vec<KubernetesConfig>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub systemd_services: Vec<SystemdService>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DockerProject {
    pub name: String,
    pub path: String,
    pub containers: usize,
    pub status: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub container_details: Vec<ContainerInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerInfo {
    pub name: String,
    pub status: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextStatus {
    Active,
    Configured,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KubernetesConfig {
    pub name: String,
    pub status: ContextStatus,
    pub nodes: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub namespaces: Vec<KubernetesNamespace>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KubernetesNamespace {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub deployments: Vec<KubernetesDeployment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KubernetesDeployment {
    pub name: String,
    pub replicas: i32,
    pub ready: i32,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SystemdService {
    pub name: String,
    pub status: String,
    pub sub_status: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemdServiceDetail {
    pub id: String,
    pub description: String,
    pub load_state: String,
    pub active_state: String,
    pub sub_state: String,
    pub unit_file_state: String,
    pub exec_main_pid: String,
    pub exec_main_status: String,
    pub unit_type: String,
    pub restart: String,
}

impl SystemState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            docker_projects: Vec::new(),
            kubernetes_configs: Vec::new(),
            systemd_services: Vec::new(),
            last_updated: now,
        }
    }

    pub fn replace_resources(
        &mut self,
        docker_projects: Vec<DockerProject>,
        kubernetes_configs: Vec<KubernetesConfig>,
        systemd_services: Vec<SystemdService>,
    ) {
        self.docker_projects = docker_projects;
        self.kubernetes_configs = kubernetes_configs;
        self.systemd_services = systemd_services;
    }
}

impl ContextStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ContextStatus::Active => "Active",
            ContextStatus::Configured => "Configured",
        }
    }
}

impl std::fmt::Display for ContextStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl KubernetesDeployment {
    pub fn new(name: impl Into<String>, replicas: i32, ready: i32) -> Self {
        Self {
            name: name.into(),
            replicas,
            ready,
            status: deployment_health(replicas, ready),
        }
    }
}

pub fn deployment_health(replicas: i32, ready: i32) -> String {
    if ready < replicas {
        format!("Degraded ({ready}/{replicas} ready)")
    } else {
        "Healthy".to_string()
    }
}

impl SystemdService {
    pub fn is_active(&self) -> bool {
        self.status.starts_with("active")
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
