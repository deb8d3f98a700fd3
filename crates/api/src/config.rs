use std::path::PathBuf;
use std::time::Duration;

use kuvertki_pipeline::GenerationConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. In production,
/// override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    /// A `*` entry makes the layer permissive.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `300`). Generous because
    /// the synchronous endpoint runs the whole pipeline inline.
    pub request_timeout_secs: u64,
    /// Path to the template deck archive (default: `template.pptx`,
    /// expected adjacent to the running process).
    pub template_path: PathBuf,
    /// Directory receiving assembled decks and final PDFs (default:
    /// `output`, created at startup).
    pub output_dir: PathBuf,
    /// Root under which per-job working directories are created (default:
    /// the system temp directory).
    pub work_root: PathBuf,
    /// Converter binary name or path (default: `soffice`).
    pub soffice_bin: String,
    /// Maximum concurrently running asynchronous jobs (default: `4`).
    /// Saturation is surfaced to the caller as 503.
    pub max_concurrent_jobs: usize,
    /// Kill a hung converter after this many seconds (default: `120`).
    pub convert_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default         |
    /// |------------------------|-----------------|
    /// | `HOST`                 | `0.0.0.0`       |
    /// | `PORT`                 | `8000`          |
    /// | `CORS_ORIGINS`         | `*`             |
    /// | `REQUEST_TIMEOUT_SECS` | `300`           |
    /// | `TEMPLATE_PATH`        | `template.pptx` |
    /// | `OUTPUT_DIR`           | `output`        |
    /// | `WORK_ROOT`            | system temp dir |
    /// | `SOFFICE_BIN`          | `soffice`       |
    /// | `MAX_CONCURRENT_JOBS`  | `4`             |
    /// | `CONVERT_TIMEOUT_SECS` | `120`           |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let template_path =
            PathBuf::from(std::env::var("TEMPLATE_PATH").unwrap_or_else(|_| "template.pptx".into()));

        let output_dir = PathBuf::from(std::env::var("OUTPUT_DIR").unwrap_or_else(|_| "output".into()));

        let work_root = std::env::var("WORK_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir());

        let soffice_bin = std::env::var("SOFFICE_BIN").unwrap_or_else(|_| "soffice".into());

        let max_concurrent_jobs: usize = std::env::var("MAX_CONCURRENT_JOBS")
            .unwrap_or_else(|_| "4".into())
            .parse()
            .expect("MAX_CONCURRENT_JOBS must be a valid usize");

        let convert_timeout_secs: u64 = std::env::var("CONVERT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("CONVERT_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            template_path,
            output_dir,
            work_root,
            soffice_bin,
            max_concurrent_jobs,
            convert_timeout_secs,
        }
    }

    /// The pipeline-facing slice of this configuration.
    pub fn generation(&self) -> GenerationConfig {
        GenerationConfig {
            template_path: self.template_path.clone(),
            output_dir: self.output_dir.clone(),
            work_root: self.work_root.clone(),
            soffice_bin: self.soffice_bin.clone(),
            convert_timeout: Duration::from_secs(self.convert_timeout_secs),
        }
    }
}
