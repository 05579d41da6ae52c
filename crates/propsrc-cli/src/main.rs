//! `propsrc`: inspect layered property sources
//!
//! Sources are described by a TOML manifest:
//!
//! ```toml
//! include_env = true
//!
//! [[source]]
//! name = "defaults"
//! path = "config/defaults.toml"
//!
//! [[source]]
//! name = "local"
//! path = "config/local.yaml"
//! position = { before = "defaults" }
//! ```

mod manifest;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use manifest::Manifest;
use propsrc_core::{PropertyResolver, PropertySources};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn cli() -> Command {
    Command::new("propsrc")
        .version(propsrc_core::VERSION)
        .about("Inspect layered property sources")
        .subcommand_required(true)
        .arg(
            Arg::new("manifest")
                .long("manifest")
                .short('m')
                .global(true)
                .default_value("propsrc.toml")
                .value_parser(value_parser!(PathBuf))
                .help("Manifest listing the sources to load"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log source loading at debug level"),
        )
        .subcommand(Command::new("list").about("List sources, highest precedence first"))
        .subcommand(
            Command::new("get")
                .about("Resolve a single property")
                .arg(Arg::new("key").required(true).help("Property key, e.g. server.port"))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the raw value as JSON, with its source"),
                ),
        )
        .subcommand(
            Command::new("resolve")
                .about("Expand ${key:default} placeholders in text")
                .arg(Arg::new("text").required(true).help("Text containing placeholders"))
                .arg(
                    Arg::new("ignore-unresolvable")
                        .long("ignore-unresolvable")
                        .action(ArgAction::SetTrue)
                        .help("Leave unknown placeholders in place instead of failing"),
                ),
        )
}

fn init_tracing(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn load(matches: &ArgMatches) -> Result<PropertySources> {
    let path = matches
        .get_one::<PathBuf>("manifest")
        .context("missing --manifest")?;
    let manifest = Manifest::load(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    manifest.assemble(base_dir)
}

fn list(sources: &PropertySources) {
    for (rank, source) in sources.iter().enumerate() {
        println!("{rank}\t{}\t{} properties", source.name(), source.property_names().len());
    }
}

fn get(sources: &PropertySources, args: &ArgMatches) -> Result<()> {
    let key = args.get_one::<String>("key").context("missing key")?;

    if args.get_flag("json") {
        let Some((source, value)) = sources.find_property(key) else {
            bail!("property '{key}' not found");
        };
        let out = serde_json::json!({ "key": key, "source": source, "value": value });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match PropertyResolver::new(sources).get_string(key)? {
        Some(value) => println!("{value}"),
        None => bail!("property '{key}' not found"),
    }
    Ok(())
}

fn resolve(sources: &PropertySources, args: &ArgMatches) -> Result<()> {
    let text = args.get_one::<String>("text").context("missing text")?;
    let resolver = PropertyResolver::new(sources).ignore_unresolvable(args.get_flag("ignore-unresolvable"));
    println!("{}", resolver.resolve_placeholders(text)?);
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    match matches.subcommand() {
        Some(("list", args)) => list(&load(args)?),
        Some(("get", args)) => get(&load(args)?, args)?,
        Some(("resolve", args)) => resolve(&load(args)?, args)?,
        _ => unreachable!("subcommand is required"),
    }
    Ok(())
}
