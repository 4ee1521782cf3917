use anyhow::{Context as _, Result};
use std::fs;
use tera::{Context, Tera};

use crate::{
    models::{LaunchSpec, TemplateSource},
    services::DockerfileFrontend,
};

const EMBEDDED_TEMPLATE: &str = include_str!("../../templates/Dockerfile.tera");

const TEMPLATE_NAME: &str = "Dockerfile";

/// Renders the Dockerfile template with the launch parameters.
///
/// Substitution is plain text. Password and username values flow unescaped
/// into generated shell and config lines; restricting their charset is an
/// open integration question, not handled here.
pub struct TeraDockerfileFrontend {
    source: TemplateSource,
}

impl TeraDockerfileFrontend {
    pub fn new(source: TemplateSource) -> TeraDockerfileFrontend {
        TeraDockerfileFrontend { source }
    }
}

impl DockerfileFrontend for TeraDockerfileFrontend {
    fn dockerfile(&mut self, spec: &LaunchSpec) -> Result<String> {
        let template = match &self.source {
            TemplateSource::Embedded => EMBEDDED_TEMPLATE.to_string(),
            TemplateSource::File(path) => fs::read_to_string(path)
                .with_context(|| format!("couldn't read template {:?}", path))?,
        };

        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, &template)?;

        let mut context = Context::new();
        context.insert("image", &spec.image.0);
        context.insert("password", &spec.password);
        context.insert("username", &spec.username);
        context.insert("uid", &spec.uid);
        context.insert("port", &spec.port);

        let rendered = tera.render(TEMPLATE_NAME, &context)?;

        Ok(rendered)
    }
}
