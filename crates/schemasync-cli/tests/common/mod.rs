#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use schemasync_core::Config;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(30);

/// A generator stand-in shaped like `typescript-fetch` output, including
/// extras that must not be published.
#[allow(dead_code)]
pub const FAKE_GENERATOR: &str = r#"out=""
while [ $# -gt 0 ]; do
    case "$1" in
        -o) out="$2"; shift ;;
    esac
    shift
done
mkdir -p "$out/apis" "$out/models" "$out/.openapi-generator"
echo "export class MessagesApi {}" > "$out/apis/MessagesApi.ts"
echo "export interface Message {}" > "$out/models/Message.ts"
echo "export class Configuration {}" > "$out/runtime.ts"
echo "export * from './runtime';" > "$out/index.ts"
echo "generator readme" > "$out/README.md"
echo "apis/MessagesApi.ts" > "$out/.openapi-generator/FILES"
"#;

#[allow(dead_code)]
pub const FAILING_GENERATOR: &str = "echo 'invalid schema: paths is required' >&2\nexit 3\n";

/// Schema body comfortably above the default size threshold.
#[allow(dead_code)]
pub const SCHEMA: &str = r#"{"openapi":"3.1.0","info":{"title":"SMS Gateway","version":"0.1.0"},"paths":{"/api/v1/messages":{"get":{"operationId":"messages-list"}}}}"#;

/// Create a `schemasync` command isolated from the caller's environment.
#[allow(dead_code)]
pub fn schemasync_cmd(cwd: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("schemasync"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.current_dir(cwd);
    for var in [
        "SCHEMASYNC_CONFIG",
        "SCHEMASYNC_BACKEND_URL",
        "SCHEMASYNC_FRONTEND_DIR",
        "SCHEMASYNC_OUTPUT_DIR",
        "SCHEMASYNC_MIN_SCHEMA_BYTES",
        "SCHEMASYNC_GENERATOR",
        "SCHEMASYNC_WORK_DIR",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Temporary project with a config file pointing at `base_url`.
#[allow(dead_code)]
pub struct Project {
    pub temp: TempDir,
    pub config_path: PathBuf,
}

#[allow(dead_code)]
impl Project {
    /// Project whose generator runs `script` through `sh`.
    pub fn new(base_url: &str, script: &str) -> Self {
        let temp = TempDir::new().unwrap();
        let script_path = temp.path().join("generator.sh");
        fs::write(&script_path, script).unwrap();

        let mut config = Config::default();
        config.backend.base_url = base_url.to_string();
        config.generator.command = vec!["sh".to_string(), script_path.display().to_string()];
        config.publish.frontend_dir = temp.path().join("frontend");
        config.publish.work_dir = Some(temp.path().join("work"));

        let config_path = temp.path().join("schemasync.toml");
        config.save(&config_path).unwrap();
        Self { temp, config_path }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = schemasync_cmd(self.temp.path());
        cmd.arg("--config").arg(&self.config_path);
        cmd
    }

    pub fn destination(&self) -> PathBuf {
        self.temp.path().join("frontend").join("src").join("client")
    }

    pub fn work_dir_is_empty(&self) -> bool {
        let work = self.temp.path().join("work");
        !work.exists() || fs::read_dir(work).unwrap().next().is_none()
    }

    pub fn published_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.destination())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
