//! ssm-inject CLI - resolve aws-ssm placeholders in configuration files
//!
//! Usage:
//!   ssm-inject inject config.yaml prod.yaml --region us-east-1
//!   ssm-inject get /app/prod/db --format yaml
//!   ssm-inject check config.yaml

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use ssm_inject_aws::{SsmStore, SsmStoreOptions};
use ssm_inject_core::{document, find_placeholders, Injector, MemoryStore, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// ssm-inject - Fill configuration placeholders from AWS SSM Parameter Store
#[derive(Parser)]
#[command(name = "ssm-inject")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every placeholder in the configuration
    Inject {
        /// Configuration file(s), merged in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format: yaml, json
        #[arg(short, long, default_value = "yaml")]
        format: String,

        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only output the value at this dotted path (e.g., database.host)
        #[arg(short, long)]
        select: Option<String>,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Resolve a single parameter path
    Get {
        /// Parameter path (e.g., /app/prod/db/host or /app/${STAGE}/db)
        path: String,

        /// Output format: text, json, yaml
        #[arg(short, long, default_value = "text")]
        format: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Parse files and list their placeholders without contacting the store
    Check {
        /// Configuration file(s) to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Where parameter values come from
#[derive(Args, Clone, Debug, Default)]
struct StoreArgs {
    /// Read parameters from a local YAML/JSON file instead of SSM
    #[arg(long)]
    params: Option<PathBuf>,

    /// AWS region
    #[arg(long)]
    region: Option<String>,

    /// AWS profile name
    #[arg(long)]
    profile: Option<String>,

    /// SSM endpoint URL (e.g., http://localhost:4566 for LocalStack)
    #[arg(long)]
    endpoint: Option<String>,
}

/// Why a command failed; decides the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    /// A placeholder or parameter path could not be resolved
    Resolution,
    /// Bad input files, arguments or output target
    Usage,
}

impl Failure {
    fn code(self) -> u8 {
        match self {
            Failure::Resolution => 1,
            Failure::Usage => 2,
        }
    }
}

impl From<Failure> for ExitCode {
    fn from(failure: Failure) -> Self {
        ExitCode::from(failure.code())
    }
}

/// Run the CLI with the process arguments
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Inject {
            files,
            format,
            output,
            select,
            store,
        } => cmd_inject(files, &format, output, select.as_deref(), &store),

        Commands::Get {
            path,
            format,
            store,
        } => cmd_get(&path, &format, &store),

        Commands::Check { files } => cmd_check(files),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,ssm_inject_core=debug,ssm_inject_aws=debug,ssm_inject_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Also installs the log -> tracing bridge for the library crates
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn build_injector(args: &StoreArgs) -> Result<Injector, String> {
    if let Some(params) = &args.params {
        let value = document::load_file(params)
            .map_err(|e| format!("Failed to load parameters {}: {}", params.display(), e))?;
        let store = MemoryStore::from_value(&value)
            .map_err(|e| format!("Invalid parameters file {}: {}", params.display(), e))?;
        tracing::debug!(count = store.len(), "Using local parameters file");
        return Ok(Injector::new(store));
    }

    let store = SsmStore::with_options(SsmStoreOptions {
        endpoint: args.endpoint.clone(),
        region: args.region.clone(),
        profile: args.profile.clone(),
    })
    .map_err(|e| e.to_string())?;
    Ok(Injector::new(store))
}

fn load_config(files: &[PathBuf]) -> Result<Value, String> {
    if files.is_empty() {
        return Err("No configuration files specified".to_string());
    }
    document::load_merged(files).map_err(|e| format!("Failed to load configuration: {}", e))
}

fn render(value: &Value, format: &str) -> Result<String, String> {
    match format {
        "json" => document::to_json(value)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| e.to_string()),
        "yaml" | "yml" => document::to_yaml(value).map_err(|e| e.to_string()),
        "text" => Ok(match value {
            Value::Sequence(_) | Value::Mapping(_) => {
                document::to_yaml(value).map_err(|e| e.to_string())?
            }
            scalar => format!("{}\n", scalar),
        }),
        other => Err(format!(
            "Unsupported format: {}. Use text, yaml, or json.",
            other
        )),
    }
}

fn cmd_inject(
    files: Vec<PathBuf>,
    format: &str,
    output: Option<PathBuf>,
    select: Option<&str>,
    store: &StoreArgs,
) -> ExitCode {
    if format == "text" {
        eprintln!("{}", "Unsupported format: text. Use yaml or json.".red());
        return Failure::Usage.into();
    }

    let config = match load_config(&files) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.red());
            return Failure::Usage.into();
        }
    };

    let injector = match build_injector(store) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("{}", e.red());
            return Failure::Usage.into();
        }
    };
    tracing::debug!(store = injector.store_name(), "Resolving placeholders");

    let resolved = match injector.inject(&config) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{} Resolution failed\n", "✗".red());
            eprintln!("{}", e);
            return Failure::Resolution.into();
        }
    };

    let selected = match select_subtree(&resolved, select) {
        Ok(v) => v,
        Err(failure) => return failure.into(),
    };

    let content = match render(selected, format) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            return Failure::Usage.into();
        }
    };

    if let Some(output_path) = output {
        if let Err(e) = std::fs::write(&output_path, &content) {
            eprintln!("{}: {}", "Error writing file".red(), e);
            return Failure::Usage.into();
        }
        eprintln!("{} Wrote to {}", "✓".green(), output_path.display());
    } else {
        print!("{}", content);
    }
    ExitCode::SUCCESS
}

fn select_subtree<'a>(resolved: &'a Value, select: Option<&str>) -> Result<&'a Value, Failure> {
    let Some(path) = select else {
        return Ok(resolved);
    };
    resolved.get_path(path).map_err(|_| {
        eprintln!("{}: Path '{}' not found", "Error".red(), path);
        Failure::Usage
    })
}

fn cmd_get(path: &str, format: &str, store: &StoreArgs) -> ExitCode {
    let injector = match build_injector(store) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("{}", e.red());
            return Failure::Usage.into();
        }
    };

    let value = match injector.resolve_path(path) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            return Failure::Resolution.into();
        }
    };

    match render(&value, format) {
        Ok(content) => {
            print!("{}", content);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            Failure::Usage.into()
        }
    }
}

fn cmd_check(files: Vec<PathBuf>) -> ExitCode {
    let mut all_valid = true;

    for file in files {
        let config = match document::load_file(&file) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                all_valid = false;
                continue;
            }
        };

        let placeholders = find_placeholders(&config);
        println!(
            "{} {}: {} placeholder(s)",
            "✓".green(),
            file.display(),
            placeholders.len()
        );
        for line in placeholder_lines(&placeholders) {
            println!("    {}", line);
        }
    }

    if all_valid {
        ExitCode::SUCCESS
    } else {
        Failure::Usage.into()
    }
}

fn placeholder_lines(placeholders: &[(String, ssm_inject_core::Placeholder)]) -> Vec<String> {
    placeholders
        .iter()
        .map(|(location, p)| {
            let mut line = format!("{} -> {}", location, p.path);
            if p.json {
                line.push_str(" (json)");
            }
            if let Some(suffix) = &p.suffix {
                line.push_str(&format!(" + '{}'", suffix));
            }
            line
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_inject_args() {
        let cli = Cli::try_parse_from([
            "ssm-inject",
            "-v",
            "inject",
            "base.yaml",
            "prod.yaml",
            "--format",
            "json",
            "--region",
            "us-west-2",
            "--endpoint",
            "http://localhost:4566",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Inject {
                files,
                format,
                store,
                select,
                ..
            } => {
                assert_eq!(files, vec![PathBuf::from("base.yaml"), PathBuf::from("prod.yaml")]);
                assert_eq!(format, "json");
                assert_eq!(select, None);
                assert_eq!(store.region.as_deref(), Some("us-west-2"));
                assert_eq!(store.endpoint.as_deref(), Some("http://localhost:4566"));
                assert_eq!(store.params, None);
            }
            _ => panic!("expected inject"),
        }
    }

    #[test]
    fn test_inject_requires_files() {
        assert!(Cli::try_parse_from(["ssm-inject", "inject"]).is_err());
    }

    #[test]
    fn test_parse_get_with_params() {
        let cli =
            Cli::try_parse_from(["ssm-inject", "get", "/app/prod/db", "--params", "params.yaml"])
                .unwrap();
        match cli.command {
            Commands::Get {
                path,
                format,
                store,
            } => {
                assert_eq!(path, "/app/prod/db");
                assert_eq!(format, "text");
                assert_eq!(store.params, Some(PathBuf::from("params.yaml")));
            }
            _ => panic!("expected get"),
        }
    }

    #[test]
    fn test_render_formats() {
        let tree = document::from_yaml("host: db.internal\nport: 5432").unwrap();

        assert_eq!(
            render(&tree, "yaml").unwrap(),
            "host: db.internal\nport: 5432\n"
        );
        assert_eq!(
            render(&tree, "json").unwrap(),
            "{\n  \"host\": \"db.internal\",\n  \"port\": 5432\n}\n"
        );
        assert_eq!(
            render(&Value::String("db.internal".into()), "text").unwrap(),
            "db.internal\n"
        );
        assert_eq!(render(&tree, "text").unwrap(), "host: db.internal\nport: 5432\n");
        assert!(render(&tree, "toml").is_err());
    }

    #[test]
    fn test_select_subtree() {
        let resolved = document::from_yaml("db:\n  host: db.internal\n  port: 5432").unwrap();

        assert_eq!(select_subtree(&resolved, None).unwrap(), &resolved);
        assert_eq!(
            select_subtree(&resolved, Some("db.host")).unwrap(),
            &Value::from("db.internal")
        );
    }

    #[test]
    fn test_missing_select_path_is_usage_failure() {
        let resolved = document::from_yaml("db:\n  host: db.internal").unwrap();

        let failure = select_subtree(&resolved, Some("db.password")).unwrap_err();
        assert_eq!(failure, Failure::Usage);
        assert_eq!(failure.code(), 2);
        assert_eq!(Failure::Resolution.code(), 1);
    }

    #[test]
    fn test_placeholder_lines() {
        let tree = document::from_yaml(
            "db:\n  creds: aws-ssm-json://app/prod/creds\nhealth: aws-ssm://app/prod/domain|/health\nplain: x",
        )
        .unwrap();

        assert_eq!(
            placeholder_lines(&find_placeholders(&tree)),
            vec![
                "db.creds -> /app/prod/creds (json)".to_string(),
                "health -> /app/prod/domain + '/health'".to_string(),
            ]
        );
    }

    #[test]
    fn test_build_injector_from_params_file() {
        let dir = std::env::temp_dir().join(format!("ssm-inject-cli-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let params = dir.join("params.yaml");
        std::fs::write(&params, "/app/prod/db/host: db.internal\n/app/prod/db/port: 5432\n")
            .unwrap();

        let injector = build_injector(&StoreArgs {
            params: Some(params),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(injector.store_name(), "memory");
        let resolved = injector
            .inject(&document::from_yaml("db: aws-ssm://app/prod/db").unwrap())
            .unwrap();
        assert_eq!(
            resolved,
            document::from_yaml("db:\n  host: db.internal\n  port: '5432'").unwrap()
        );
    }

    #[test]
    fn test_build_injector_rejects_bad_params() {
        let dir = std::env::temp_dir().join(format!("ssm-inject-cli-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let params = dir.join("bad-params.yaml");
        std::fs::write(&params, "app/db/host: missing-slash\n").unwrap();

        let err = build_injector(&StoreArgs {
            params: Some(params),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.contains("must start with /"));
    }
}
