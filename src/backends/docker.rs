use anyhow::{bail, Context, Result};
use log::debug;
use serde::Deserialize;
use std::{
    path::Path,
    process::{Command, Stdio},
};

use crate::{
    models::{Container, ContainerId, ContainerName, ContainerStatus, LaunchSpec},
    services::ContainerBackend,
};

/// One line of `docker ps --format '{{json .}}'` output.
#[derive(Clone, Debug, Deserialize)]
struct PsRow {
    #[serde(rename = "ID")]
    id: String,

    #[serde(rename = "Names")]
    names: String,

    #[serde(rename = "State")]
    state: String,
}

/// Drives the docker binary over its command-line interface. Nothing but
/// exit statuses and query stdout is interpreted; build and run output is
/// passed straight through to the operator.
pub struct DockerBackend;

impl DockerBackend {
    pub fn new() -> DockerBackend {
        DockerBackend
    }
}

pub fn build_args(tag: &ContainerName, dockerfile: &Path) -> Vec<String> {
    vec![
        "build".into(),
        "-t".into(),
        tag.0.clone(),
        "-f".into(),
        dockerfile.display().to_string(),
        ".".into(),
    ]
}

pub fn run_args(spec: &LaunchSpec) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "-d".into(),
        "-u".into(),
        spec.identity_flag(),
        "-w".into(),
        spec.home_dir(),
        "--name".into(),
        spec.name.0.clone(),
        "-p".into(),
        spec.port_mapping(),
    ];

    for volume in spec.volumes.iter() {
        args.push("-v".into());
        args.push(volume.mount_flag());
    }

    args.push(spec.name.0.clone());

    args
}

fn parse_ps_row(line: &str) -> Result<Container> {
    let row: PsRow = serde_json::from_str(line).context("couldn't decode docker ps output")?;

    let status = match row.state.as_str() {
        "created" => ContainerStatus::Created,
        "running" => ContainerStatus::Running,
        "exited" => ContainerStatus::Exited,
        state => {
            eprintln!("Unknown container state: {:?}", state);
            ContainerStatus::Unknown
        }
    };

    Ok(Container {
        id: ContainerId(row.id),
        name: ContainerName(row.names),
        status,
    })
}

/// Runs docker with inherited stdio and propagates a non-zero exit.
fn run_checked(args: &[String]) -> Result<()> {
    debug!("docker {}", args.join(" "));

    let status = Command::new("docker")
        .args(args)
        .status()
        .with_context(|| format!("couldn't invoke docker {}", args[0]))?;

    if !status.success() {
        bail!("docker {} exited with {}", args[0], status);
    }

    Ok(())
}

/// Runs docker capturing stdout, stderr passing through to the operator.
fn capture_checked(args: &[String]) -> Result<String> {
    debug!("docker {}", args.join(" "));

    let output = Command::new("docker")
        .args(args)
        .stderr(Stdio::inherit())
        .output()
        .with_context(|| format!("couldn't invoke docker {}", args[0]))?;

    if !output.status.success() {
        bail!("docker {} exited with {}", args[0], output.status);
    }

    Ok(String::from_utf8(output.stdout)?)
}

impl ContainerBackend for DockerBackend {
    fn find_container(&mut self, name: &ContainerName) -> Result<Option<Container>> {
        let args = vec![
            "ps".to_string(),
            "-a".into(),
            "--filter".into(),
            format!("name=^/{}$", name.0),
            "--format".into(),
            "{{json .}}".into(),
        ];
        let stdout = capture_checked(&args)?;

        match stdout.lines().find(|line| !line.trim().is_empty()) {
            Some(line) => parse_ps_row(line).map(Some),
            None => Ok(None),
        }
    }

    fn build_image(&mut self, tag: &ContainerName, dockerfile: &Path) -> Result<()> {
        run_checked(&build_args(tag, dockerfile))
    }

    fn run_container(&mut self, spec: &LaunchSpec) -> Result<ContainerId> {
        let stdout = capture_checked(&run_args(spec))?;

        Ok(ContainerId(stdout.trim().to_string()))
    }

    fn stop_container(&mut self, name: &ContainerName) -> Result<()> {
        run_checked(&["stop".to_string(), name.0.clone()])
    }

    fn remove_container(&mut self, name: &ContainerName) -> Result<()> {
        run_checked(&["rm".to_string(), name.0.clone()])
    }
}
