use crate::cmd::command::{CommandError, CommandKiller, ExternalCommand};
use std::path::Path;
use std::process::ExitStatus;
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum DockerError {
    #[error("Docker Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Docker terminated with an unknown error: {0}")]
    ExecutionError(#[from] std::io::Error),

    #[error("Docker terminated with a non success exit status code: {0}")]
    ExitStatusError(ExitStatus),

    #[error("Docker aborted due to user cancel request: {0}")]
    Aborted(String),

    #[error("Docker command terminated due to timeout: {0}")]
    Timeout(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerImage {
    pub registry: Url,
    pub name: String,
    pub tags: Vec<String>,
}

impl ContainerImage {
    pub fn new(registry: Url, name: String, tags: Vec<String>) -> Self {
        ContainerImage { registry, name, tags }
    }

    pub fn registry_host(&self) -> String {
        match self.registry.port() {
            Some(port) => format!("{}:{}", self.registry.host_str().unwrap_or_default(), port),
            None => self.registry.host_str().unwrap_or_default().to_string(),
        }
    }

    pub fn image_names(&self) -> Vec<String> {
        let host = self.registry_host();

        self.tags
            .iter()
            .map(|tag| format!("{}/{}:{}", host, &self.name, tag))
            .collect()
    }

    /// Full name of the image with its first tag, `None` if the image has no tag.
    pub fn image_name(&self) -> Option<String> {
        self.image_names().into_iter().next()
    }

    /// Image name without any tag, as expected by registry deletion commands.
    pub fn name_without_tag(&self) -> String {
        format!("{}/{}", self.registry_host(), self.name)
    }
}

#[derive(Debug, Clone)]
pub struct Docker {
    common_envs: Vec<(String, String)>,
    platform: String,
}

impl Docker {
    pub fn new(socket_location: Option<Url>) -> Result<Self, DockerError> {
        // Cloud Run only runs linux/amd64 images
        let mut docker = Docker {
            common_envs: vec![("DOCKER_BUILDKIT".to_string(), "1".to_string())],
            platform: "linux/amd64".to_string(),
        };

        // Override DOCKER_HOST if we use a TCP socket
        if let Some(socket_location) = socket_location {
            docker
                .common_envs
                .push(("DOCKER_HOST".to_string(), socket_location.to_string()))
        }

        // Make sure the daemon is reachable before doing anything
        docker_exec(
            &["version", "--format", "{{.Server.Version}}"],
            &docker.get_all_envs(&[]),
            &mut |line| debug!("docker server version: {}", line),
            &mut |line| warn!("{}", line),
            &CommandKiller::never(),
        )
        .map_err(|e| DockerError::InvalidConfig(format!("Docker daemon is not reachable: {e}")))?;

        Ok(docker)
    }

    fn get_all_envs<'a>(&'a self, envs: &'a [(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
        let mut all_envs: Vec<(&str, &str)> = self.common_envs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        all_envs.append(&mut envs.to_vec());

        all_envs
    }

    /// Login against `registry`, user and password are taken from the url. The password goes through stdin.
    pub fn login(&self, registry: &Url) -> Result<(), DockerError> {
        info!("Docker login {} as user {}", registry.host_str().unwrap_or_default(), registry.username());
        let password = urlencoding::decode(registry.password().unwrap_or_default())
            .unwrap_or_default()
            .to_string();
        let args = login_args(registry);

        let mut cmd = ExternalCommand::new("docker", &args, &self.get_all_envs(&[]));
        cmd.set_stdin(&password);
        cmd.exec_with_abort(
            &mut |line| info!("{}", line),
            &mut |line| warn!("{}", line),
            &CommandKiller::never(),
        )
        .map_err(to_docker_error)
    }

    pub fn build<Stdout, Stderr>(
        &self,
        dockerfile: &Path,
        context: &Path,
        image_to_build: &ContainerImage,
        build_args: &[(&str, &str)],
        stdout_output: &mut Stdout,
        stderr_output: &mut Stderr,
        should_abort: &CommandKiller,
    ) -> Result<(), DockerError>
    where
        Stdout: FnMut(String),
        Stderr: FnMut(String),
    {
        // if there is no tags, nothing to build
        if image_to_build.tags.is_empty() {
            return Ok(());
        }

        if !dockerfile.is_file() {
            return Err(DockerError::InvalidConfig(format!(
                "provided dockerfile `{}` is not a valid file",
                dockerfile.display()
            )));
        }

        if !context.is_dir() {
            return Err(DockerError::InvalidConfig(format!(
                "provided docker build context `{}` is not a valid directory",
                context.display()
            )));
        }

        info!("Docker build {:?}", image_to_build.image_name());
        let args_string = build_args_for(&self.platform, dockerfile, context, image_to_build, build_args);

        docker_exec(
            &args_string.iter().map(|x| x.as_str()).collect::<Vec<&str>>(),
            &self.get_all_envs(&[]),
            stdout_output,
            stderr_output,
            should_abort,
        )
    }

    pub fn push<Stdout, Stderr>(
        &self,
        image: &ContainerImage,
        stdout_output: &mut Stdout,
        stderr_output: &mut Stderr,
        should_abort: &CommandKiller,
    ) -> Result<(), DockerError>
    where
        Stdout: FnMut(String),
        Stderr: FnMut(String),
    {
        info!("Docker push {:?}", image);
        // docker push only accepts one reference per call
        for image_name in image.image_names() {
            docker_exec(
                &["push", image_name.as_str()],
                &self.get_all_envs(&[]),
                stdout_output,
                stderr_output,
                should_abort,
            )?;
        }

        Ok(())
    }

    pub fn remove_local_image(&self, image: &ContainerImage) -> Result<(), DockerError> {
        info!("Docker remove local image {:?}", image);
        let image_names = image.image_names();
        let mut args = vec!["image", "rm", "--force"];
        args.extend(image_names.iter().map(|x| x.as_str()));

        docker_exec(
            &args,
            &self.get_all_envs(&[]),
            &mut |line| debug!("{}", line),
            &mut |line| warn!("{}", line),
            &CommandKiller::never(),
        )
    }
}

fn build_args_for(
    platform: &str,
    dockerfile: &Path,
    context: &Path,
    image_to_build: &ContainerImage,
    build_args: &[(&str, &str)],
) -> Vec<String> {
    let mut args_string: Vec<String> = vec![
        "build".to_string(),
        "--progress=plain".to_string(),
        format!("--platform={platform}"),
        "-f".to_string(),
        dockerfile.to_str().unwrap_or_default().to_string(),
    ];

    for image_name in image_to_build.image_names() {
        args_string.push("--tag".to_string());
        args_string.push(image_name)
    }

    for (k, v) in build_args {
        args_string.push("--build-arg".to_string());
        args_string.push(format!("{k}={v}"));
    }

    args_string.push(context.to_str().unwrap_or_default().to_string());
    args_string
}

fn docker_exec<F, X>(
    args: &[&str],
    envs: &[(&str, &str)],
    stdout_output: &mut F,
    stderr_output: &mut X,
    cmd_killer: &CommandKiller,
) -> Result<(), DockerError>
where
    F: FnMut(String),
    X: FnMut(String),
{
    let mut cmd = ExternalCommand::new("docker", args, envs);
    cmd.exec_with_abort(stdout_output, stderr_output, cmd_killer)
        .map_err(to_docker_error)
}

fn to_docker_error(err: CommandError) -> DockerError {
    match err {
        CommandError::TimeoutError(msg) => DockerError::Timeout(msg),
        CommandError::Killed(msg) => DockerError::Aborted(msg),
        CommandError::ExitStatusError(err) => DockerError::ExitStatusError(err),
        CommandError::ExecutionError(err) => DockerError::ExecutionError(err),
    }
}

fn login_args(registry: &Url) -> Vec<&str> {
    vec![
        "login",
        registry.host_str().unwrap_or_default(),
        "-u",
        registry.username(),
        "--password-stdin",
    ]
}
