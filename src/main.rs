use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use serde::Serialize;

use hostwatch::config::{self, Config};
use hostwatch::format::{format_bytes, truncate_cell};
use hostwatch::monitor::Monitor;
use hostwatch::system::records::{
    ConnectionRecord, ProcessRecord, ServiceRecord, SessionRecord, SystemVitals,
};

#[derive(Parser)]
#[command(
    name = "hostwatch",
    about = "Host telemetry snapshots: processes, services, connections, sessions, vitals"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Refresh interval in seconds (overrides config)
    #[arg(long)]
    refresh_interval: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Collect one snapshot and print it
    Snapshot {
        /// Restrict output to one domain
        #[arg(long, value_enum)]
        domain: Option<DomainArg>,

        /// Substring filter applied to processes and services
        #[arg(long)]
        filter: Option<String>,

        /// Emit JSON instead of tables
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run the background refresh loop and print periodic summaries
    Watch {
        /// Number of summaries to print before exiting
        #[arg(long, default_value_t = 10)]
        iterations: usize,
    },
    /// Terminate a process by PID or by name
    Kill {
        #[arg(long)]
        pid: Option<u32>,

        #[arg(long)]
        name: Option<String>,
    },
    /// Issue a service-control request
    Service {
        #[command(subcommand)]
        action: ServiceCommand,
    },
}

#[derive(Subcommand)]
enum ServiceCommand {
    Start { name: String },
    Stop { name: String },
    Restart { name: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum DomainArg {
    Processes,
    Services,
    Connections,
    Sessions,
    Vitals,
}

#[derive(Serialize)]
struct SnapshotDump {
    processes: Vec<ProcessRecord>,
    services: Vec<ServiceRecord>,
    connections: Vec<ConnectionRecord>,
    sessions: Vec<SessionRecord>,
    vitals: Option<SystemVitals>,
    cpu_usage_percent: f64,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    #[cfg(feature = "refresh-tracing")]
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);
    let monitor = Monitor::initialize(&config).map_err(|e| eyre!(e.to_string()))?;

    let result = run(&monitor, &config, cli.command.unwrap_or(Command::Snapshot {
        domain: None,
        filter: None,
        json: false,
    }));

    monitor.shutdown();
    result
}

fn run(monitor: &Monitor, config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Snapshot {
            domain,
            filter,
            json,
        } => run_snapshot(monitor, config, domain, filter.as_deref().unwrap_or(""), json),
        Command::Watch { iterations } => run_watch(monitor, iterations),
        Command::Kill { pid, name } => run_kill(monitor, pid, name),
        Command::Service { action } => run_service(monitor, action),
    }
}

fn run_snapshot(
    monitor: &Monitor,
    config: &Config,
    domain: Option<DomainArg>,
    filter: &str,
    json: bool,
) -> Result<()> {
    let report = monitor.manual_refresh();
    for d in hostwatch::Domain::ALL {
        if !report.ok(d) {
            eprintln!("warning: {d} collection failed; showing stale data");
        }
    }

    if json {
        let dump = SnapshotDump {
            processes: monitor.filter_processes(filter),
            services: monitor.filter_services(filter),
            connections: monitor.connections(),
            sessions: monitor.sessions(),
            vitals: monitor.system_vitals(),
            cpu_usage_percent: monitor.cpu_usage_percent(),
        };
        println!("{}", serde_json::to_string_pretty(&dump)?);
        return Ok(());
    }

    let width = config.output.max_cell_width;
    match domain {
        Some(DomainArg::Processes) => print_processes(&monitor.filter_processes(filter), width),
        Some(DomainArg::Services) => print_services(&monitor.filter_services(filter), width),
        Some(DomainArg::Connections) => print_connections(&monitor.connections()),
        Some(DomainArg::Sessions) => print_sessions(&monitor.sessions()),
        Some(DomainArg::Vitals) => print_vitals(monitor),
        None => {
            print_vitals(monitor);
            println!();
            print_processes(&monitor.filter_processes(filter), width);
            println!();
            print_services(&monitor.filter_services(filter), width);
            println!();
            print_connections(&monitor.connections());
            println!();
            print_sessions(&monitor.sessions());
        }
    }
    Ok(())
}

fn run_watch(monitor: &Monitor, iterations: usize) -> Result<()> {
    if iterations == 0 {
        return Err(eyre!("--iterations must be greater than 0"));
    }

    monitor.start_auto_refresh()?;
    for _ in 0..iterations {
        std::thread::sleep(monitor.refresh_interval());
        let vitals_cores = monitor.system_vitals().map(|v| v.cpu_cores).unwrap_or(0);
        println!(
            "cpu {:5.1}%  processes {:4}  connections {:4}  sessions {:2}  cores {}",
            monitor.cpu_usage_percent(),
            monitor.processes().len(),
            monitor.connections().len(),
            monitor.sessions().len(),
            vitals_cores,
        );
    }
    monitor.stop_auto_refresh();
    Ok(())
}

fn run_kill(monitor: &Monitor, pid: Option<u32>, name: Option<String>) -> Result<()> {
    let ok = match (pid, name) {
        (Some(pid), None) => monitor.terminate_pid(pid),
        (None, Some(name)) => monitor.terminate_by_name(&name),
        _ => return Err(eyre!("pass exactly one of --pid or --name")),
    };
    if ok {
        println!("termination requested");
        Ok(())
    } else {
        Err(eyre!("no process terminated"))
    }
}

fn run_service(monitor: &Monitor, action: ServiceCommand) -> Result<()> {
    let (verb, outcome) = match action {
        ServiceCommand::Start { name } => ("start", monitor.start_service(&name)),
        ServiceCommand::Stop { name } => ("stop", monitor.stop_service(&name)),
        ServiceCommand::Restart { name } => ("restart", monitor.restart_service(&name)),
    };
    outcome.map_err(|e| eyre!("service {verb} failed: {e}"))?;
    println!("service {verb} succeeded");
    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => config::load_config_from_path(path),
        None => config::load_config(),
    };

    if let Some(secs) = cli.refresh_interval {
        config.general.refresh_interval_secs = secs;
    }

    config
}

fn print_processes(records: &[ProcessRecord], width: usize) {
    println!(
        "{:<8} {:<8} {:<28} {:>10}  COMMAND",
        "PID", "PPID", "NAME", "MEMORY"
    );
    for p in records {
        println!(
            "{:<8} {:<8} {:<28} {:>10}  {}",
            p.pid,
            p.ppid,
            truncate_cell(&p.name, 28),
            format_bytes(p.memory_bytes),
            truncate_cell(&p.command_line, width),
        );
    }
    println!("{} processes", records.len());
}

fn print_services(records: &[ServiceRecord], width: usize) {
    println!(
        "{:<32} {:<14} {:<10}  DESCRIPTION",
        "SERVICE", "STATUS", "START"
    );
    for s in records {
        println!(
            "{:<32} {:<14} {:<10}  {}",
            truncate_cell(&s.name, 32),
            s.status.label(),
            s.start_type.label(),
            truncate_cell(&s.display_name, width),
        );
    }
    println!("{} services", records.len());
}

fn print_connections(records: &[ConnectionRecord]) {
    println!(
        "{:<5} {:<28} {:<28} {:<14} {:<8}",
        "PROTO", "LOCAL", "REMOTE", "STATE", "PID"
    );
    for c in records {
        println!(
            "{:<5} {:<28} {:<28} {:<14} {:<8}",
            c.protocol.label(),
            truncate_cell(&c.local_addr, 28),
            truncate_cell(&c.remote_addr, 28),
            c.state,
            c.pid,
        );
    }
    println!("{} connections", records.len());
}

fn print_sessions(records: &[SessionRecord]) {
    println!(
        "{:<8} {:<16} {:<12} {:<24} {:<12}",
        "ID", "USER", "DOMAIN", "LOGIN", "STATE"
    );
    for s in records {
        println!(
            "{:<8} {:<16} {:<12} {:<24} {:<12}",
            s.session_id,
            truncate_cell(&s.user_name, 16),
            truncate_cell(&s.domain, 12),
            truncate_cell(&s.login_time, 24),
            s.state.label(),
        );
    }
    println!("{} sessions", records.len());
}

fn print_vitals(monitor: &Monitor) {
    let Some(v) = monitor.system_vitals() else {
        println!("vitals not collected");
        return;
    };
    println!("OS:       {}", v.os_version);
    println!("Host:     {} (user {})", v.host_name, v.user_name);
    println!("Uptime:   {}", v.uptime);
    println!(
        "Memory:   {} total, {} available",
        format_bytes(v.total_memory),
        format_bytes(v.available_memory)
    );
    println!("CPU:      {} ({} cores)", v.cpu_model, v.cpu_cores);
    println!("CPU use:  {:.1}%", monitor.cpu_usage_percent());
}
