use std::path::PathBuf;

/// Port rstudio-server listens on inside the container.
pub const RSTUDIO_PORT: u16 = 8787;

#[derive(Clone, Debug, Hash, PartialOrd, Ord, PartialEq, Eq)]
pub struct ImageName(pub String);

#[derive(Clone, Debug, Hash, PartialOrd, Ord, PartialEq, Eq)]
pub struct ContainerId(pub String);

#[derive(Clone, Debug, Hash, PartialOrd, Ord, PartialEq, Eq)]
pub struct ContainerName(pub String);

#[derive(Clone, Debug, Hash)]
pub struct Container {
    pub id: ContainerId,
    pub name: ContainerName,
    pub status: ContainerStatus,
}

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum ContainerStatus {
    Created,
    Running,
    Exited,
    Unknown,
}

/// A host path bind-mounted into the container at the identical path.
/// No remapping is supported.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct VolumeMount(pub String);

impl VolumeMount {
    /// Splits the comma-separated `--volumes` value, preserving order.
    /// Paths are passed through untouched; anything the runtime rejects
    /// surfaces as a runtime error.
    pub fn parse_list(value: &str) -> Vec<VolumeMount> {
        value.split(',').map(|path| VolumeMount(path.into())).collect()
    }

    pub fn mount_flag(&self) -> String {
        format!("{}:{}", self.0, self.0)
    }
}

/// Where the Dockerfile template text comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateSource {
    Embedded,
    File(PathBuf),
}

/// The fully resolved inputs for one container launch.
#[derive(Clone, Debug)]
pub struct LaunchSpec {
    pub image: ImageName,
    pub username: String,
    pub password: String,
    pub uid: u32,
    pub gid: u32,
    pub name: ContainerName,
    pub port: u16,
    pub volumes: Vec<VolumeMount>,
    pub template: TemplateSource,
    pub force: bool,
}

impl LaunchSpec {
    pub fn identity_flag(&self) -> String {
        format!("{}:{}", self.uid, self.gid)
    }

    pub fn home_dir(&self) -> String {
        format!("/home/{}", self.username)
    }

    pub fn port_mapping(&self) -> String {
        format!("{}:{}", self.port, RSTUDIO_PORT)
    }
}
