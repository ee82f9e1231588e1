use crate::collectors::{collect_resources, CollectWarning, CommandRunner, ResourceSnapshot, Scope};
use crate::config::Config;
use crate::state::SystemState;
use crate::store::{StateStore, StoreError};
use tracing::{info, warn};

pub fn capture_system_state(
    runner: &dyn CommandRunner,
    cfg: &Config,
    store: &StateStore,
) -> Result<SystemState, StoreError> {
    let snapshot = collect_resources(runner, &cfg.tools, Scope::All);
    log_warnings(&snapshot.warnings);
    persist(store, snapshot)
}

pub fn persist(store: &StateStore, snapshot: ResourceSnapshot) -> Result<SystemState, StoreError> {
    let state = store.update(
        snapshot.docker_projects,
        snapshot.kubernetes_configs,
        snapshot.systemd_services,
    )?;
    info!(
        path = %store.path().display(),
        docker_projects = state.docker_projects.len(),
        kubernetes_configs = state.kubernetes_configs.len(),
        systemd_services = state.systemd_services.len(),
        "system state captured"
    );
    Ok(state)
}

pub fn log_warnings(warnings: &[CollectWarning]) {
    for w in warnings {
        warn!(source = %w.source, scope = %w.scope, error = %w.message, "discovery branch skipped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::testing::ScriptedRunner;
    use crate::state::ContextStatus;
    use crate::store::STATE_FILE_NAME;

    #[test]
    fn capture_without_any_tool_saves_empty_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join(STATE_FILE_NAME));

        let state = capture_system_state(&ScriptedRunner::new(), &Config::default(), &store).unwrap();

        assert!(state.docker_projects.is_empty());
        assert!(state.kubernetes_configs.is_empty());
        assert!(state.systemd_services.is_empty());
        assert!(store.path().is_file());
    }

    #[test]
    fn capture_persists_partial_results() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join(STATE_FILE_NAME));
        let runner = ScriptedRunner::new()
            .ok("kubectl config current-context", "prod\n")
            .ok("kubectl config get-contexts -o name", "prod\n")
            .fail(
                "kubectl get namespaces --context prod -o jsonpath={.items[*].metadata.name}",
                "Unable to connect to the server",
            );

        capture_system_state(&runner, &Config::default(), &store).unwrap();

        let stored = store.load().unwrap();
        assert_eq!(stored.kubernetes_configs.len(), 1);
        assert_eq!(stored.kubernetes_configs[0].status, ContextStatus::Active);
        assert!(stored.kubernetes_configs[0].namespaces.is_empty());
    }
}
