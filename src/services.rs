use anyhow::Result;
use std::path::Path;

use crate::models::{Container, ContainerId, ContainerName, LaunchSpec};

/// Ambient operator identity, injectable so tests substitute deterministic
/// values instead of depending on the executing account.
pub trait Environment {
    fn username(&self) -> Result<String>;

    fn uid(&self) -> u32;

    fn gid(&self) -> u32;
}

pub trait DockerfileFrontend {
    fn dockerfile(&mut self, spec: &LaunchSpec) -> Result<String>;
}

pub trait ContainerBackend {
    /// Any container, running or stopped, holding exactly this name.
    fn find_container(&mut self, name: &ContainerName) -> Result<Option<Container>>;

    fn build_image(&mut self, tag: &ContainerName, dockerfile: &Path) -> Result<()>;

    fn run_container(&mut self, spec: &LaunchSpec) -> Result<ContainerId>;

    fn stop_container(&mut self, name: &ContainerName) -> Result<()>;

    fn remove_container(&mut self, name: &ContainerName) -> Result<()>;
}
