mod telemetry;

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use spandoc_convert::FromDomain;
use spandoc_convert::document::ServiceDocument;
use spandoc_core::config::{ConverterConfig, config_file_path};
use spandoc_core::model::Span;
use tracing::{info, warn};

use crate::telemetry::init_cli_tracing;

#[derive(Parser, Debug)]
#[command(name = "spandoc")]
#[command(about = "Convert trace spans into flattened index documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Config file (defaults to $SPANDOC_CONFIG or XDG path)")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Convert spans to one JSON document per line")]
    Convert {
        #[arg(long, default_value = "-")]
        input: String,
        #[arg(long, value_enum, default_value_t = InputFormat::Json)]
        format: InputFormat,
        #[arg(long, default_value = "-")]
        output: String,
        #[arg(long, help = "Promote every non-binary tag to a field")]
        all_tags_as_fields: bool,
        #[arg(long = "tag-key", help = "Promote this tag key (repeatable)")]
        tag_keys: Vec<String>,
        #[arg(long, help = "Replacement for '.' in promoted field names")]
        dot_replacement: Option<String>,
        #[arg(long, help = "Also emit service/operation documents")]
        services: bool,
    },
    #[command(about = "Print the effective converter configuration")]
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    /// One domain span per line.
    Json,
    /// A single OTLP ExportTraceServiceRequest protobuf.
    Otlp,
}

fn main() -> anyhow::Result<()> {
    init_cli_tracing();
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(config_file_path);
    let mut cfg = ConverterConfig::load_from(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    match cli.command {
        Commands::Convert {
            input,
            format,
            output,
            all_tags_as_fields,
            tag_keys,
            dot_replacement,
            services,
        } => {
            if all_tags_as_fields {
                cfg.all_tags_as_fields = true;
            }
            cfg.tag_keys_as_fields.extend(tag_keys);
            if let Some(v) = dot_replacement {
                cfg.tag_dot_replacement = v;
            }
            run_convert(&cfg, &input, format, &output, services)
        }
        Commands::Config => {
            let rendered = toml::to_string(&cfg).context("rendering config")?;
            print!("{rendered}");
            Ok(())
        }
    }
}

fn run_convert(
    cfg: &ConverterConfig,
    input: &str,
    format: InputFormat,
    output: &str,
    services: bool,
) -> anyhow::Result<()> {
    let converter = FromDomain::new(cfg);
    let mut reader = open_input(input)?;
    let mut writer = open_output(output)?;
    let mut service_docs = BTreeSet::new();
    let mut converted = 0usize;
    let mut skipped = 0usize;

    let mut emit = |span: &Span, writer: &mut dyn Write| -> anyhow::Result<()> {
        let doc = converter.convert_span(span);
        serde_json::to_writer(&mut *writer, &doc).context("writing span document")?;
        writeln!(writer)?;
        if services {
            service_docs.insert(converter.convert_service(span));
        }
        converted += 1;
        Ok(())
    };

    match format {
        InputFormat::Json => {
            for (idx, line) in reader.lines().enumerate() {
                let line = line.with_context(|| format!("reading {input}"))?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<Span>(&line) {
                    Ok(span) => emit(&span, &mut writer)?,
                    Err(e) => {
                        warn!(line = idx + 1, error = %e, "skipping malformed span");
                        skipped += 1;
                    }
                }
            }
        }
        InputFormat::Otlp => {
            let mut raw = Vec::new();
            reader
                .read_to_end(&mut raw)
                .with_context(|| format!("reading {input}"))?;
            for span in spandoc_ingest::otlp::decode_export(&raw)? {
                emit(&span, &mut writer)?;
            }
        }
    }

    write_services(&service_docs, &mut writer)?;
    writer.flush().context("flushing output")?;
    info!(converted, skipped, "conversion finished");
    Ok(())
}

fn write_services(docs: &BTreeSet<ServiceDocument>, writer: &mut dyn Write) -> anyhow::Result<()> {
    for doc in docs {
        serde_json::to_writer(&mut *writer, doc).context("writing service document")?;
        writeln!(writer)?;
    }
    Ok(())
}

fn open_input(input: &str) -> anyhow::Result<Box<dyn BufRead>> {
    if input == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(input).with_context(|| format!("opening {input}"))?;
    Ok(Box::new(BufReader::new(file)))
}

fn open_output(output: &str) -> anyhow::Result<Box<dyn Write>> {
    if output == "-" {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    let file = File::create(output).with_context(|| format!("creating {output}"))?;
    Ok(Box::new(BufWriter::new(file)))
}
