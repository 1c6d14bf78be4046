use crate::config::Config;
use serde::Serialize;
use std::path::{Component, Path};

const CLIENT_TEMPLATE: &str = include_str!("../../templates/client.ts.tmpl");
const README_TEMPLATE: &str = include_str!("../../templates/README.md.tmpl");

/// Values substituted into the authored files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateContext {
    /// Frontend build-time variable holding the API base URL.
    pub base_url_env: String,
    /// Fallback base URL when the variable is unset.
    pub default_base_url: String,
    /// Destination path as shown in the README.
    pub destination_hint: String,
}

impl TemplateContext {
    /// Context for the destination and backend described by `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url_env: config.publish.base_url_env.clone(),
            default_base_url: config.backend.base_url.trim_end_matches('/').to_string(),
            destination_hint: display_path(&config.destination()),
        }
    }

    /// Rendered `client.ts`.
    #[must_use]
    pub fn render_client(&self) -> String {
        self.render(CLIENT_TEMPLATE)
    }

    /// Rendered `README.md`.
    #[must_use]
    pub fn render_readme(&self) -> String {
        self.render(README_TEMPLATE)
    }

    fn render(&self, template: &str) -> String {
        [
            ("base_url_env", self.base_url_env.as_str()),
            ("default_base_url", self.default_base_url.as_str()),
            ("destination_hint", self.destination_hint.as_str()),
        ]
        .iter()
        .fold(template.to_string(), |rendered, (name, value)| {
            rendered.replace(&format!("{{{{{name}}}}}"), value)
        })
    }
}

// Forward slashes on every platform so renders stay byte-identical.
fn display_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::CurDir => None,
            Component::RootDir => Some(String::new()),
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect::<Vec<_>>()
        .join("/")
}
