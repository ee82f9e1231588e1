use super::{run_checked, run_combined, CollectError, Collected, CommandRunner, Source};
use crate::config::ToolsConfig;
use crate::state::{SystemdService, SystemdServiceDetail};
use std::collections::HashMap;
use tracing::{debug, info};

const SERVICE_SUFFIX: &str = ".service";
const DETAIL_PROPERTIES: &str =
    "--property=Id,Description,LoadState,ActiveState,SubState,UnitFileState,ExecMainPID,ExecMainStatus,Type,Restart";

pub fn collect_services(runner: &dyn CommandRunner, tools: &ToolsConfig) -> Collected<SystemdService> {
    let systemctl = tools.systemctl.as_str();
    if let Err(err) = run_checked(runner, systemctl, &["--version"]) {
        return Collected::unavailable(Source::Systemd, &err);
    }

    let stdout = match run_checked(
        runner,
        systemctl,
        &[
            "list-units",
            "--type=service",
            "--all",
            "--no-pager",
            "--plain",
            "--no-legend",
        ],
    ) {
        Ok(stdout) => stdout,
        Err(err) => return Collected::unavailable(Source::Systemd, &err),
    };

    let services = parse_list_units(&stdout);
    debug!(services = services.len(), "systemd services collected");
    Collected {
        items: services,
        warnings: Vec::new(),
    }
}

pub fn parse_list_units(output: &str) -> Vec<SystemdService> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim().trim_start_matches('●').trim_start();
            let mut cols = line.split_whitespace();
            let unit = cols.next()?;
            let load = cols.next()?;
            let active = cols.next()?;
            let sub = cols.next()?;
            if unit == "UNIT" && load == "LOAD" {
                return None;
            }
            let description = cols.collect::<Vec<_>>().join(" ");

            let status = if load == "loaded" {
                active.to_string()
            } else {
                format!("{active} ({load})")
            };

            Some(SystemdService {
                name: unit.strip_suffix(SERVICE_SUFFIX).unwrap_or(unit).to_string(),
                status,
                sub_status: sub.to_string(),
                description,
            })
        })
        .collect()
}

pub fn unit_name(service: &str) -> String {
    if service.ends_with(SERVICE_SUFFIX) {
        service.to_string()
    } else {
        format!("{service}{SERVICE_SUFFIX}")
    }
}

pub fn service_detail(
    runner: &dyn CommandRunner,
    tools: &ToolsConfig,
    service: &str,
) -> Result<SystemdServiceDetail, CollectError> {
    let unit = unit_name(service);
    let stdout = run_checked(runner, &tools.systemctl, &["show", DETAIL_PROPERTIES, unit.as_str()])?;
    Ok(parse_properties(&stdout))
}

pub fn parse_properties(output: &str) -> SystemdServiceDetail {
    let mut props: HashMap<&str, &str> = output
        .lines()
        .filter_map(|line| line.split_once('='))
        .collect();
    let mut take = |key: &str| props.remove(key).unwrap_or_default().to_string();

    SystemdServiceDetail {
        id: take("Id"),
        description: take("Description"),
        load_state: take("LoadState"),
        active_state: take("ActiveState"),
        sub_state: take("SubState"),
        unit_file_state: take("UnitFileState"),
        exec_main_pid: take("ExecMainPID"),
        exec_main_status: take("ExecMainStatus"),
        unit_type: take("Type"),
        restart: take("Restart"),
    }
}

pub fn service_logs(
    runner: &dyn CommandRunner,
    tools: &ToolsConfig,
    service: &str,
    lines: u32,
) -> Result<String, CollectError> {
    let unit = unit_name(service);
    let count = lines.to_string();
    run_combined(
        runner,
        &tools.journalctl,
        &["-u", unit.as_str(), "--no-pager", "-n", count.as_str()],
    )
}

pub fn restart_service(
    runner: &dyn CommandRunner,
    tools: &ToolsConfig,
    service: &str,
) -> Result<(), CollectError> {
    let unit = unit_name(service);
    run_combined(runner, &tools.systemctl, &["restart", unit.as_str()])?;
    info!(unit = %unit, "service restarted");
    Ok(())
}
