use super::{run_checked, run_combined, CollectError, Collected, CommandRunner, Source};
use crate::config::ToolsConfig;
use crate::state::{ContainerInfo, DockerProject, COMPOSE_PROJECT_LABEL, COMPOSE_WORKING_DIR_LABEL};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

const PS_FORMAT: &str = "{{.Names}}|{{.Status}}|{{.Labels}}";

pub fn collect_projects(runner: &dyn CommandRunner, tools: &ToolsConfig) -> Collected<DockerProject> {
    let stdout = match run_checked(runner, &tools.docker, &["ps", "--format", PS_FORMAT]) {
        Ok(stdout) => stdout,
        Err(err) => return Collected::unavailable(Source::Docker, &err),
    };

    let projects = group_by_project(&stdout);
    debug!(projects = projects.len(), "docker compose projects collected");
    Collected {
        items: projects,
        warnings: Vec::new(),
    }
}

pub fn group_by_project(ps_output: &str) -> Vec<DockerProject> {
    let mut projects: Vec<DockerProject> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for line in ps_output.lines() {
        let mut parts = line.splitn(3, '|');
        let (Some(name), Some(status), Some(labels_raw)) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };

        let labels = parse_labels(labels_raw);
        let Some(project_name) = labels
            .get(COMPOSE_PROJECT_LABEL)
            .filter(|p| !p.is_empty())
            .cloned()
        else {
            continue;
        };

        let container = ContainerInfo {
            name: name.trim().to_string(),
            status: status.trim().to_string(),
            labels,
        };

        match index.get(&project_name) {
            Some(&i) => {
                let project = &mut projects[i];
                project.containers += 1;
                project.container_details.push(container);
            }
            None => {
                let path = container
                    .labels
                    .get(COMPOSE_WORKING_DIR_LABEL)
                    .filter(|p| !p.is_empty())
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string());
                index.insert(project_name.clone(), projects.len());
                projects.push(DockerProject {
                    name: project_name,
                    path,
                    containers: 1,
                    status: "Running".to_string(),
                    container_details: vec![container],
                });
            }
        }
    }

    projects
}

pub fn parse_labels(raw: &str) -> BTreeMap<String, String> {
    raw.split(',')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            Some((key.trim().to_string(), value.to_string()))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeCommand {
    program: String,
    plugin: bool,
}

impl ComposeCommand {
    fn args<'a>(&self, rest: &[&'a str]) -> Vec<&'a str> {
        let mut args = Vec::with_capacity(rest.len() + 1);
        if self.plugin {
            args.push("compose");
        }
        args.extend_from_slice(rest);
        args
    }

    fn run(&self, runner: &dyn CommandRunner, rest: &[&str]) -> Result<String, CollectError> {
        run_checked(runner, &self.program, &self.args(rest))
    }

    fn run_combined(&self, runner: &dyn CommandRunner, rest: &[&str]) -> Result<String, CollectError> {
        run_combined(runner, &self.program, &self.args(rest))
    }
}

pub fn resolve_compose(runner: &dyn CommandRunner, tools: &ToolsConfig) -> Option<ComposeCommand> {
    let candidates = [
        ComposeCommand {
            program: tools.docker.clone(),
            plugin: true,
        },
        ComposeCommand {
            program: tools.docker_compose.clone(),
            plugin: false,
        },
    ];

    for candidate in candidates {
        match runner.run(&candidate.program, &candidate.args(&["version"])) {
            Ok(out) if out.success => {
                debug!(program = %candidate.program, plugin = candidate.plugin, "compose command resolved");
                return Some(candidate);
            }
            _ => continue,
        }
    }
    None
}

pub fn compose_unavailable() -> CollectError {
    CollectError::Unavailable(
        "neither 'docker compose' nor 'docker-compose' is available on this system".to_string(),
    )
}

pub fn list_services(
    runner: &dyn CommandRunner,
    compose: &ComposeCommand,
    project: &str,
) -> Result<Vec<String>, CollectError> {
    let stdout = compose.run(runner, &["-p", project, "ps", "--services"])?;
    let services: Vec<String> = stdout.split_whitespace().map(str::to_string).collect();
    if services.is_empty() {
        return Err(CollectError::Unavailable(format!(
            "no containers found in project {project}"
        )));
    }
    Ok(services)
}

pub fn service_logs(
    runner: &dyn CommandRunner,
    compose: &ComposeCommand,
    project: &str,
    service: &str,
) -> Result<String, CollectError> {
    compose.run_combined(runner, &["-p", project, "logs", service])
}

pub fn project_logs(
    runner: &dyn CommandRunner,
    compose: &ComposeCommand,
    project: &str,
) -> Result<String, CollectError> {
    compose.run_combined(runner, &["-p", project, "logs"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::testing::ScriptedRunner;
    use crate::collectors::CommandOutput;

    const PS_LINE: &str = "docker ps --format {{.Names}}|{{.Status}}|{{.Labels}}";

    #[test]
    fn containers_sharing_a_project_are_merged() {
        let out = "\
shop-web-1|Up 2 hours|com.docker.compose.project=shop,com.docker.compose.project.working_dir=/srv/shop,com.docker.compose.service=web
shop-db-1|Up 2 hours|com.docker.compose.service=db,com.docker.compose.project=shop
registry|Up 3 days|maintainer=ops
blog-app-1|Up 5 minutes|com.docker.compose.project=blog
";
        let projects = group_by_project(out);

        assert_eq!(projects.len(), 2);
        let shop = &projects[0];
        assert_eq!(shop.name, "shop");
        assert_eq!(shop.path, "/srv/shop");
        assert_eq!(shop.containers, 2);
        assert_eq!(shop.status, "Running");
        let names: Vec<&str> = shop.container_details.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["shop-web-1", "shop-db-1"]);
        assert_eq!(
            shop.container_details[1].labels.get("com.docker.compose.service").map(String::as_str),
            Some("db")
        );

        let blog = &projects[1];
        assert_eq!(blog.path, "Unknown");
        assert_eq!(blog.containers, 1);
    }

    #[test]
    fn unlabelled_and_malformed_lines_are_skipped() {
        let out = "lonely|Up 1 second|\nbroken line\n\n";
        assert!(group_by_project(out).is_empty());
    }

    #[test]
    fn label_values_may_contain_equals() {
        let labels = parse_labels("a=1,b=x=y,novalue");
        assert_eq!(labels.get("a").map(String::as_str), Some("1"));
        assert_eq!(labels.get("b").map(String::as_str), Some("x=y"));
        assert!(!labels.contains_key("novalue"));
    }

    #[test]
    fn unreachable_daemon_yields_warning() {
        let runner = ScriptedRunner::new().fail(PS_LINE, "Cannot connect to the Docker daemon");
        let collected = collect_projects(&runner, &ToolsConfig::default());
        assert!(collected.items.is_empty());
        assert_eq!(collected.warnings.len(), 1);
        assert!(collected.warnings[0].message.contains("Cannot connect"));
    }

    #[test]
    fn compose_plugin_is_preferred() {
        let runner = ScriptedRunner::new()
            .ok("docker compose version", "Docker Compose version v2.24.0")
            .ok("docker-compose version", "docker-compose version 1.29.2");
        let compose = resolve_compose(&runner, &ToolsConfig::default()).unwrap();
        assert!(compose.plugin);
        assert_eq!(runner.calls(), vec!["docker compose version"]);
    }

    #[test]
    fn falls_back_to_standalone_compose() {
        let runner = ScriptedRunner::new()
            .fail("docker compose version", "docker: 'compose' is not a docker command.")
            .ok("docker-compose version", "docker-compose version 1.29.2")
            .ok("docker-compose -p shop ps --services", "web\ndb\n")
            .ok("docker-compose -p shop logs web", "web-1 | listening on :8080\n");
        let compose = resolve_compose(&runner, &ToolsConfig::default()).unwrap();
        assert!(!compose.plugin);

        let services = list_services(&runner, &compose, "shop").unwrap();
        assert_eq!(services, vec!["web", "db"]);
        let logs = service_logs(&runner, &compose, "shop", "web").unwrap();
        assert!(logs.contains("listening"));
    }

    #[test]
    fn no_compose_available() {
        let runner = ScriptedRunner::new();
        assert!(resolve_compose(&runner, &ToolsConfig::default()).is_none());
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn project_logs_combine_both_streams() {
        let runner = ScriptedRunner::new().ok("docker compose version", "v2").reply(
            "docker compose -p shop logs",
            CommandOutput {
                success: true,
                code: Some(0),
                stdout: "web-1  | listening on :8080\n".to_string(),
                stderr: "db-1  | ready for connections\n".to_string(),
            },
        );
        let compose = resolve_compose(&runner, &ToolsConfig::default()).unwrap();

        let logs = project_logs(&runner, &compose, "shop").unwrap();
        assert_eq!(logs, "web-1  | listening on :8080\ndb-1  | ready for connections\n");
    }

    #[test]
    fn project_logs_failure_names_the_command() {
        let runner = ScriptedRunner::new()
            .ok("docker compose version", "v2")
            .fail("docker compose -p shop logs", "no such project: shop");
        let compose = resolve_compose(&runner, &ToolsConfig::default()).unwrap();

        let err = project_logs(&runner, &compose, "shop").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("docker compose -p shop logs"), "{text}");
        assert!(text.contains("no such project: shop"), "{text}");
    }

    #[test]
    fn empty_service_listing_is_an_error() {
        let runner = ScriptedRunner::new()
            .ok("docker compose version", "v2")
            .ok("docker compose -p ghost ps --services", "\n");
        let compose = resolve_compose(&runner, &ToolsConfig::default()).unwrap();
        let err = list_services(&runner, &compose, "ghost").unwrap_err();
        assert!(err.to_string().contains("no containers found in project ghost"));
    }
}
