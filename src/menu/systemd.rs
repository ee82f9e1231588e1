use super::choose;
use crate::collectors::systemd::{restart_service, service_detail, service_logs};
use crate::collectors::CommandRunner;
use crate::config::Config;
use crate::state::{SystemdService, SystemdServiceDetail};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Logs,
    Details,
    Restart,
    Back,
}

impl Action {
    const ALL: [Action; 4] = [Action::Logs, Action::Details, Action::Restart, Action::Back];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Logs => f.write_str("📜 View Logs"),
            Action::Details => f.write_str("📊 View Details"),
            Action::Restart => f.write_str("🔄 Restart Service"),
            Action::Back => f.write_str("⬅️ Back"),
        }
    }
}

pub fn show(runner: &dyn CommandRunner, cfg: &Config, service: &SystemdService) {
    let prompt = format!("🔍 Select an action for service '{}'", service.name);
    let Some(index) = choose(&prompt, &Action::ALL) else {
        return;
    };

    match Action::ALL[index] {
        Action::Back => {}
        Action::Logs => match service_logs(runner, &cfg.tools, &service.name, cfg.journal_lines) {
            Ok(text) => println!("{text}"),
            Err(err) => println!("Error retrieving logs for service {}: {err}", service.name),
        },
        Action::Details => match service_detail(runner, &cfg.tools, &service.name) {
            Ok(detail) => print!("{}", format_detail(&detail)),
            Err(err) => println!("Error retrieving details for service {}: {err}", service.name),
        },
        Action::Restart => {
            println!("Restarting service {}...", service.name);
            match restart_service(runner, &cfg.tools, &service.name) {
                Ok(()) => println!("Service {} restarted successfully", service.name),
                Err(err) => println!("Failed to restart service {}: {err}", service.name),
            }
        }
    }
}

fn format_detail(detail: &SystemdServiceDetail) -> String {
    let rows = [
        ("Service", &detail.id),
        ("Description", &detail.description),
        ("Load State", &detail.load_state),
        ("Active State", &detail.active_state),
        ("Sub State", &detail.sub_state),
        ("Unit File State", &detail.unit_file_state),
        ("Main PID", &detail.exec_main_pid),
        ("Main Status", &detail.exec_main_status),
        ("Type", &detail.unit_type),
        ("Restart", &detail.restart),
    ];
    rows.iter()
        .map(|(label, value)| format!("{label}: {value}\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_lists_every_property() {
        let detail = SystemdServiceDetail {
            id: "sshd.service".to_string(),
            exec_main_pid: "812".to_string(),
            restart: "on-failure".to_string(),
            ..SystemdServiceDetail::default()
        };
        let text = format_detail(&detail);
        assert_eq!(text.lines().count(), 10);
        assert!(text.starts_with("Service: sshd.service\n"));
        assert!(text.contains("Main PID: 812\n"));
        assert!(text.ends_with("Restart: on-failure\n"));
    }
}
