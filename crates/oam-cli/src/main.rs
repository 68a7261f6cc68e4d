use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde_json::{Value, json};

use oam_core::config::{self, CONFIG_FILE_NAME, ModelerConfig};
use oam_core::ir::{CodeModel, CompositeTypeId, Method, Parameter};
use oam_core::parse;
use oam_core::parse::spec::ServiceDefinition;
use oam_core::transform;

#[derive(Parser)]
#[command(name = "oam", about = "OpenAPI 3.x code-model builder", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the code model of an OpenAPI document and print a summary
    Model {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: OutputFormat,

        /// Namespace recorded on the model
        #[arg(long)]
        namespace: Option<String>,

        /// Allow types whose ancestors declare no properties
        #[arg(long)]
        generate_empty_classes: bool,
    },

    /// Validate that a document parses and builds
    Validate {
        /// Path to the OpenAPI document
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Initialize a new oam configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Model {
            input,
            format,
            namespace,
            generate_empty_classes,
        } => cmd_model(input, format, namespace, generate_empty_classes),

        Commands::Validate { input } => cmd_validate(input),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "oam", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<ModelerConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

fn load_document(path: &Path) -> Result<ServiceDefinition> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let document = match ext {
        "json" => parse::from_json(&content)?,
        _ => parse::from_yaml(&content)?,
    };
    Ok(document)
}

fn cmd_model(
    input: Option<PathBuf>,
    format: OutputFormat,
    namespace: Option<String>,
    generate_empty_classes: bool,
) -> Result<()> {
    let mut cfg = try_load_config()?.unwrap_or_else(|| {
        log::debug!("no {CONFIG_FILE_NAME} found, using defaults");
        ModelerConfig::default()
    });
    if let Some(namespace) = namespace {
        cfg.namespace = namespace;
    }
    cfg.generate_empty_classes |= generate_empty_classes;

    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let document = load_document(&input)?;
    let model = transform::transform_with_options(&document, &cfg.transform_options())
        .with_context(|| format!("failed to build the code model of {}", input.display()))?;

    let summary = build_model_summary(&model);

    match format {
        OutputFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn cmd_validate(input: PathBuf) -> Result<()> {
    let document = load_document(&input)?;

    let title = document
        .info
        .as_ref()
        .and_then(|info| info.title.as_deref())
        .unwrap_or("<untitled>");
    eprintln!("Valid OpenAPI {} document: {}", document.openapi, title);
    eprintln!("  Paths: {}", document.paths.len() + document.custom_paths.len());
    eprintln!("  Schemas: {}", document.components.schemas.len());

    // Also validate that it builds
    let cfg = try_load_config()?.unwrap_or_default();
    let model = transform::transform_with_options(&document, &cfg.transform_options())?;
    eprintln!("  Methods: {}", model.methods.len());
    eprintln!("  Model types: {}", model.model_types.len());
    eprintln!("  Enum types: {}", model.enum_types.len());

    eprintln!("Validation successful.");
    Ok(())
}

fn composite_names(model: &CodeModel, ids: &[CompositeTypeId]) -> Vec<String> {
    ids.iter().map(|id| model.composite(*id).name.clone()).collect()
}

fn parameter_summary(model: &CodeModel, parameter: &Parameter) -> Value {
    json!({
        "name": parameter.serialized_name,
        "in": format!("{:?}", parameter.location).to_lowercase(),
        "type": model.type_name(&parameter.model_type),
        "required": parameter.is_required,
    })
}

fn method_summary(model: &CodeModel, method: &Method) -> Value {
    let returns = method
        .return_type
        .body
        .as_ref()
        .map(|body| model.type_name(body));
    json!({
        "name": method.name,
        "group": method.group,
        "method": method.http_method.as_str(),
        "url": method.url,
        "parameters": method
            .parameters
            .iter()
            .map(|p| parameter_summary(model, p))
            .collect::<Vec<_>>(),
        "returns": returns,
        "deprecated": method.is_deprecated(),
    })
}

fn build_model_summary(model: &CodeModel) -> Value {
    let types: Vec<Value> = model
        .model_types
        .iter()
        .map(|id| {
            let composite = model.composite(*id);
            json!({
                "name": composite.name,
                "base": composite.base_type.map(|base| model.composite(base).name.clone()),
                "discriminator": composite.polymorphic_discriminator,
                "properties": composite
                    .properties
                    .iter()
                    .map(|p| json!({ "name": p.name, "type": model.type_name(&p.model_type) }))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    let enums: Vec<Value> = model
        .enum_types
        .iter()
        .map(|e| {
            json!({
                "name": e.name,
                "values": e.serialized_values(),
                "model_as_string": e.model_as_string,
            })
        })
        .collect();

    json!({
        "name": model.name,
        "namespace": model.namespace,
        "api_version": model.api_version,
        "base_url": model.base_url,
        "types": types,
        "enums": enums,
        "methods": model
            .methods
            .iter()
            .map(|m| method_summary(model, m))
            .collect::<Vec<_>>(),
        "errors": composite_names(model, &model.error_types),
        "headers": composite_names(model, &model.header_types),
    })
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
