use anyhow::{Context, Result};
use log::info;
use std::{fs, path::PathBuf};

use crate::{
    models::{Container, ContainerId, ContainerStatus, LaunchSpec},
    services::ContainerBackend,
};

/// The rendered build definition is parked at a fixed path in the working
/// directory, truncated on every launch and left behind afterward.
pub const BUILD_FILE: &str = "Dockerfile.temp";

#[derive(Debug)]
pub enum LaunchOutcome {
    Launched(ContainerId),
    /// A same-named container already exists and `--force` was not given.
    /// Nothing has been mutated.
    Conflict(Container),
}

pub struct Launcher {
    backend: Box<dyn ContainerBackend>,
    build_file: PathBuf,
}

impl Launcher {
    pub fn new<B>(backend: B) -> Launcher
    where
        B: 'static + ContainerBackend,
    {
        Launcher::with_build_file(backend, BUILD_FILE)
    }

    pub fn with_build_file<B, P>(backend: B, build_file: P) -> Launcher
    where
        B: 'static + ContainerBackend,
        P: Into<PathBuf>,
    {
        Launcher {
            backend: Box::new(backend),
            build_file: build_file.into(),
        }
    }

    pub fn launch(&mut self, spec: &LaunchSpec, dockerfile: &str) -> Result<LaunchOutcome> {
        if let Some(container) = self.backend.find_container(&spec.name)? {
            info!("found existing container {:?}", container);

            if !spec.force {
                return Ok(LaunchOutcome::Conflict(container));
            }

            self.remove_existing(&container)?;
        }

        let id = self.build_and_run(spec, dockerfile)?;

        Ok(LaunchOutcome::Launched(id))
    }

    /// Tears down a same-named container so the name can be reused. A still
    /// running container is stopped first.
    fn remove_existing(&mut self, container: &Container) -> Result<()> {
        if container.status == ContainerStatus::Running {
            self.backend.stop_container(&container.name)?;
        }

        self.backend.remove_container(&container.name)?;

        Ok(())
    }

    fn build_and_run(&mut self, spec: &LaunchSpec, dockerfile: &str) -> Result<ContainerId> {
        fs::write(&self.build_file, dockerfile)
            .with_context(|| format!("couldn't write {:?}", self.build_file))?;
        info!("wrote build definition to {:?}", self.build_file);

        self.backend.build_image(&spec.name, &self.build_file)?;

        let id = self.backend.run_container(spec)?;

        Ok(id)
    }
}
