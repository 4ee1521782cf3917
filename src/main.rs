use anyhow::Result;
use crossterm::{
    style::{self, Colorize, Styler},
    QueueableCommand,
};
use log::info;
use std::{
    io::{stdout, Write},
    path::PathBuf,
    process,
};
use structopt::StructOpt;

use backends::DockerBackend;
use environment::HostEnvironment;
use frontends::TeraDockerfileFrontend;
use launcher::{LaunchOutcome, Launcher};
use models::{ContainerName, ImageName, LaunchSpec, TemplateSource, VolumeMount};
use services::{DockerfileFrontend, Environment};

mod backends;
mod environment;
mod frontends;
mod launcher;
mod models;
mod services;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "rstudio-spawn",
    about = "Builds a templated RStudio Server image and runs it as a personal, disposable container."
)]
struct Opt {
    /// Base image for the container.
    #[structopt(long)]
    image: String,

    /// Login password for the provisioned account.
    #[structopt(long)]
    password: String,

    /// Container name, also used as the image build tag.
    #[structopt(long, default_value = "local_rstudio")]
    name: String,

    /// Account name inside the container (default: the invoking user).
    #[structopt(long)]
    username: Option<String>,

    /// Numeric user id inside the container (default: the invoking user's).
    #[structopt(long)]
    uid: Option<u32>,

    /// Host port mapped to RStudio Server.
    #[structopt(long, default_value = "8042")]
    port: u16,

    /// Comma-separated host paths to bind-mount 1:1 into the container.
    #[structopt(long)]
    volumes: String,

    /// Dockerfile template to render instead of the embedded one.
    #[structopt(long = "dockerfile_template")]
    dockerfile_template: Option<PathBuf>,

    /// Stop and remove an existing container holding the target name.
    #[structopt(long)]
    force: bool,
}

fn resolve_spec(opt: Opt, environment: &impl Environment) -> Result<LaunchSpec> {
    let username = match opt.username {
        Some(username) => username,
        None => environment.username()?,
    };

    // An explicit uid mirrors into the gid so bind mounts keep a single
    // owner; otherwise both sides come from the host account.
    let (uid, gid) = match opt.uid {
        Some(uid) => (uid, uid),
        None => (environment.uid(), environment.gid()),
    };

    let template = match opt.dockerfile_template {
        Some(path) => TemplateSource::File(path),
        None => TemplateSource::Embedded,
    };

    Ok(LaunchSpec {
        image: ImageName(opt.image),
        username,
        password: opt.password,
        uid,
        gid,
        name: ContainerName(opt.name),
        port: opt.port,
        volumes: VolumeMount::parse_list(&opt.volumes),
        template,
        force: opt.force,
    })
}

fn main() -> Result<()> {
    pretty_env_logger::init_custom_env("LOG");

    let opt = Opt::from_args();

    let mut stdout = stdout();

    let spec = resolve_spec(opt, &HostEnvironment)?;
    info!("resolved launch spec for container {:?}", spec.name);

    let mut frontend = TeraDockerfileFrontend::new(spec.template.clone());
    let dockerfile = frontend.dockerfile(&spec)?;
    info!("rendered build definition ({} bytes)", dockerfile.len());

    let mut launcher = Launcher::new(DockerBackend::new());

    match launcher.launch(&spec, &dockerfile)? {
        LaunchOutcome::Conflict(container) => {
            stdout
                .queue(style::PrintStyledContent("WARN: ".yellow().bold()))?
                .queue(style::Print(format!(
                    "a container named {} already exists, rerun with --force to replace it.\n",
                    container.name.0
                )))?
                .flush()?;

            process::exit(1);
        }
        LaunchOutcome::Launched(container_id) => {
            info!("started container {}", container_id.0);
        }
    }

    println!("Docker container '{}' is running.", spec.name.0);
    println!("echo 'Server running with the following credentials:'");
    println!("echo 'Username: {} / {}'", spec.username, spec.uid);
    println!("echo 'Password: {}'", spec.password);
    println!(
        "echo 'Access at http://127.0.0.1:{} to use RStudio Server.'",
        spec.port
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeEnvironment;

    impl Environment for FakeEnvironment {
        fn username(&self) -> Result<String> {
            Ok("jdoe".into())
        }

        fn uid(&self) -> u32 {
            1500
        }

        fn gid(&self) -> u32 {
            1600
        }
    }

    fn parse(args: &[&str]) -> Opt {
        let argv = std::iter::once("rstudio-spawn").chain(args.iter().copied());
        Opt::from_iter(argv)
    }

    #[test]
    fn required_flags_fail_at_parse_time() {
        let missing_image = ["--password", "x", "--volumes", "/a"];
        let missing_password = ["--image", "img", "--volumes", "/a"];
        let missing_volumes = ["--image", "img", "--password", "x"];

        for args in [&missing_image, &missing_password, &missing_volumes].iter() {
            let argv = std::iter::once("rstudio-spawn").chain(args.iter().copied());
            assert!(Opt::from_iter_safe(argv).is_err());
        }
    }

    #[test]
    fn defaults_come_from_the_environment() {
        let opt = parse(&["--image", "img", "--password", "x", "--volumes", "/a"]);
        let spec = resolve_spec(opt, &FakeEnvironment).unwrap();

        assert_eq!(spec.username, "jdoe");
        assert_eq!(spec.uid, 1500);
        assert_eq!(spec.gid, 1600);
        assert_eq!(spec.name, ContainerName("local_rstudio".into()));
        assert_eq!(spec.port, 8042);
        assert_eq!(spec.template, TemplateSource::Embedded);
        assert!(!spec.force);
    }

    #[test]
    fn explicit_uid_mirrors_into_the_gid() {
        let opt = parse(&[
            "--image", "img", "--password", "x", "--volumes", "/a", "--uid", "4242",
        ]);
        let spec = resolve_spec(opt, &FakeEnvironment).unwrap();

        assert_eq!(spec.uid, 4242);
        assert_eq!(spec.gid, 4242);
    }

    #[test]
    fn explicit_username_wins_over_the_environment() {
        let opt = parse(&[
            "--image", "img", "--password", "x", "--volumes", "/a", "--username", "svc",
        ]);
        let spec = resolve_spec(opt, &FakeEnvironment).unwrap();

        assert_eq!(spec.username, "svc");
    }

    #[test]
    fn template_flag_switches_to_a_file_source() {
        let opt = parse(&[
            "--image", "img", "--password", "x", "--volumes", "/a",
            "--dockerfile_template", "Dockerfile.tera",
        ]);
        let spec = resolve_spec(opt, &FakeEnvironment).unwrap();

        assert_eq!(spec.template, TemplateSource::File("Dockerfile.tera".into()));
    }

    #[test]
    fn volumes_flag_parses_the_comma_separated_list() {
        let opt = parse(&["--image", "img", "--password", "x", "--volumes", "/a,/b"]);
        let spec = resolve_spec(opt, &FakeEnvironment).unwrap();

        assert_eq!(spec.volumes, VolumeMount::parse_list("/a,/b"));
    }
}
