//! Connected Blocks CLI
//!
//! Inspect connected block templates and run shape selection against a
//! neighborhood described in JSON.

use clap::{Parser, Subcommand, ValueEnum};
use connected_blocks::{
    load_template, load_template_library, validate, EvaluationContext, Matcher, MatcherConfig,
    Neighborhood, Template, Trigger, Yaw,
};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "connected-blocks")]
#[command(author, version, about = "Inspect and evaluate connected block templates", long_about = None)]
struct Cli {
    /// Template pack (ZIP or directory); templates are then named, not paths
    #[arg(short, long, global = true)]
    library: Option<PathBuf>,

    /// Log selection decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show shapes, patterns and warnings of a template
    Info {
        /// Template file, or template name with --library
        template: String,
    },

    /// Validate a template; exits with status 1 on any warning
    Check {
        /// Template file, or template name with --library
        template: String,
    },

    /// List the transform variants of one pattern
    Variants {
        /// Template file, or template name with --library
        template: String,

        /// Shape name
        #[arg(short, long)]
        shape: String,

        /// Pattern index within the shape
        #[arg(short, long, default_value = "0")]
        pattern: usize,

        /// Keep geometrically identical variants
        #[arg(long)]
        no_dedup: bool,
    },

    /// Run shape selection against a neighborhood
    Select {
        /// Template file, or template name with --library
        template: String,

        /// Neighborhood JSON file
        #[arg(short, long)]
        neighbors: PathBuf,

        /// Shape to test; without it every shape is tried
        #[arg(short, long)]
        shape: Option<String>,

        /// What triggered the evaluation
        #[arg(short, long, value_enum, default_value = "placement")]
        trigger: TriggerArg,

        /// Stored yaw of the evaluated block
        #[arg(short, long, value_enum, default_value = "zero")]
        orientation: OrientationArg,

        /// Material of the evaluated block
        #[arg(short, long)]
        material: Option<String>,

        /// List every matching pattern instead of the first
        #[arg(long)]
        all: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum TriggerArg {
    /// The block is being placed
    Placement,
    /// A neighbor changed
    Update,
}

impl From<TriggerArg> for Trigger {
    fn from(arg: TriggerArg) -> Self {
        match arg {
            TriggerArg::Placement => Trigger::Placement,
            TriggerArg::Update => Trigger::Update,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OrientationArg {
    Zero,
    Ninety,
    OneEighty,
    TwoSeventy,
}

impl From<OrientationArg> for Yaw {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Zero => Yaw::Zero,
            OrientationArg::Ninety => Yaw::Ninety,
            OrientationArg::OneEighty => Yaw::OneEighty,
            OrientationArg::TwoSeventy => Yaw::TwoSeventy,
        }
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { template } => {
            let template = open_template(cli.library.as_ref(), &template)?;
            show_info(&template);
        }
        Commands::Check { template } => {
            let template = open_template(cli.library.as_ref(), &template)?;
            if !check_template(&template) {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Variants {
            template,
            shape,
            pattern,
            no_dedup,
        } => {
            let template = open_template(cli.library.as_ref(), &template)?;
            show_variants(&template, &shape, pattern, !no_dedup)?;
        }
        Commands::Select {
            template,
            neighbors,
            shape,
            trigger,
            orientation,
            material,
            all,
        } => {
            let template = open_template(cli.library.as_ref(), &template)?;
            let neighbors = Neighborhood::from_json(&fs::read_to_string(&neighbors)?)?;
            run_selection(
                &template,
                &neighbors,
                shape.as_deref(),
                trigger.into(),
                orientation.into(),
                material.as_deref(),
                all,
            )?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_template(
    library: Option<&PathBuf>,
    template: &str,
) -> Result<Template, Box<dyn std::error::Error>> {
    match library {
        Some(path) => {
            eprintln!("Loading template pack from {:?}...", path);
            let library = load_template_library(path)?;
            eprintln!("  Found {} templates", library.template_count());
            Ok(library.resolve(template)?)
        }
        None => {
            let template = load_template(template)?;
            if let Some(parent) = &template.parent {
                tracing::warn!(
                    "Template has Parent '{}' but no --library was given; inherited fields are missing",
                    parent
                );
            }
            Ok(template)
        }
    }
}

fn show_info(template: &Template) {
    let matcher = Matcher::new(template);

    println!("Template Info:");
    if let Some(comment) = &template.comment {
        println!("  Comment: {}", comment);
    }
    println!(
        "  Default shape: {}",
        template.default_shape.as_deref().unwrap_or("<none>")
    );
    println!(
        "  Connects to other materials: {}",
        template.connects_to_other_materials()
    );
    println!(
        "  Update after placement: {}",
        !template.dont_update_after_initial_placement()
    );

    println!("\nShapes:");
    for (name, shape) in template.shapes() {
        println!("  {} ({} patterns)", name, shape.patterns().len());
        for (i, pattern) in shape.patterns().iter().enumerate() {
            println!(
                "    [{}] {:<16} rules: {:<3} variants: {:<3} yaw: {}",
                i,
                pattern.pattern_type.as_deref().unwrap_or("-"),
                pattern.rules().len(),
                matcher.variants(pattern).len(),
                pattern.yaw()
            );
        }
    }

    check_template(template);
}

fn check_template(template: &Template) -> bool {
    let warnings = validate(template);
    if warnings.is_empty() {
        println!("\nNo warnings");
        return true;
    }

    println!("\n{} warnings:", warnings.len());
    for warning in &warnings {
        println!("  {}", warning);
    }
    false
}

fn show_variants(
    template: &Template,
    shape_name: &str,
    index: usize,
    dedup: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let shape = template
        .shape(shape_name)
        .ok_or_else(|| format!("Shape '{}' is not defined", shape_name))?;
    let pattern = shape.patterns().get(index).ok_or_else(|| {
        format!(
            "Shape '{}' has {} patterns, no index {}",
            shape_name,
            shape.patterns().len(),
            index
        )
    })?;

    let config = MatcherConfig::default().with_dedup_variants(dedup);
    let matcher = Matcher::with_config(template, config);

    for variant in matcher.variants(pattern) {
        println!("{}:", variant.transform);
        for rule in &variant.rules {
            let kind = if rule.is_exclude() { "exclude" } else { "include" };
            match rule.offset() {
                Some(offset) => println!("  {} {}", kind, offset),
                None => println!("  {} <malformed position>", kind),
            }
        }
    }

    Ok(())
}

fn run_selection(
    template: &Template,
    neighbors: &Neighborhood,
    shape: Option<&str>,
    trigger: Trigger,
    orientation: Yaw,
    material: Option<&str>,
    all: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = MatcherConfig::default().with_report_ambiguous(true);
    let matcher = Matcher::with_config(template, config);

    let mut ctx = EvaluationContext::new(trigger, neighbors).with_orientation(orientation);
    if let Some(material) = material {
        ctx = ctx.with_material(material);
    }

    if all {
        let shape = shape.ok_or("--all needs --shape")?;
        let hits = matcher.matching_patterns(shape, &ctx);
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    let selection = match shape {
        Some(shape) => matcher.select_shape(shape, &ctx),
        None => matcher.resolve_shape(&ctx),
    };
    println!("{}", serde_json::to_string_pretty(&selection)?);

    if let Some(tags) = selection.face_tags(template) {
        eprintln!("Face tags in world directions:");
        for (face, tags) in tags.iter() {
            eprintln!("  {}: {}", face, tags.join(", "));
        }
    }

    Ok(())
}
