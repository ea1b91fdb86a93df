use std::sync::Arc;

use clap::Parser;
use log::info;

use dlgen_rs::config::GeneratorConfig;
use dlgen_rs::factory::ElementFactory;
use dlgen_rs::generator::FeatureGenerator;
use dlgen_rs::instance::Instance;
use dlgen_rs::state::State;
use dlgen_rs::vocabulary::Vocabulary;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Complexity limit for concepts.
    #[clap(long, value_name = "INT", default_value = "5")]
    concept_limit: u32,

    /// Complexity limit for roles.
    #[clap(long, value_name = "INT", default_value = "5")]
    role_limit: u32,

    /// Complexity limit for boolean features.
    #[clap(long, value_name = "INT", default_value = "10")]
    boolean_limit: u32,

    /// Complexity limit for count features.
    #[clap(long, value_name = "INT", default_value = "10")]
    count_limit: u32,

    /// Complexity limit for distance features.
    #[clap(long, value_name = "INT", default_value = "10")]
    distance_limit: u32,

    /// Time budget, in seconds.
    #[clap(long, value_name = "SECS", default_value = "180")]
    time_limit: f64,

    /// Maximum number of features.
    #[clap(long, value_name = "INT", default_value = "100000")]
    feature_limit: usize,

    /// Load the configuration from a TOML file instead (limit flags are ignored).
    #[clap(long, value_name = "FILE")]
    config: Option<std::path::PathBuf>,

    /// Keep every rule enabled.
    #[clap(long)]
    all_rules: bool,

    /// Evaluate candidates in parallel.
    #[clap(long)]
    parallel: bool,

    /// Print per-rule statistics.
    #[clap(long)]
    stats: bool,
}

fn blocks() -> color_eyre::Result<(ElementFactory, Vec<State>)> {
    let mut vocabulary = Vocabulary::new();
    vocabulary.add_predicate("on", 2)?;
    vocabulary.add_predicate("on_g", 2)?;
    vocabulary.add_predicate("ontable", 1)?;
    vocabulary.add_predicate("holding", 1)?;
    vocabulary.add_predicate("clear", 1)?;
    vocabulary.add_predicate("arm-empty", 0)?;
    let vocabulary = Arc::new(vocabulary);

    let mut instance = Instance::new(0, vocabulary.clone());
    let atoms = [
        instance.add_atom("on", &["a", "b"])?,
        instance.add_atom("on", &["b", "a"])?,
        instance.add_atom("ontable", &["a"])?,
        instance.add_atom("ontable", &["b"])?,
        instance.add_atom("holding", &["a"])?,
        instance.add_atom("holding", &["b"])?,
        instance.add_atom("clear", &["a"])?,
        instance.add_atom("clear", &["b"])?,
        instance.add_atom("arm-empty", &[])?,
    ];
    instance.add_static_atom("on_g", &["a", "b"])?;
    let instance = Arc::new(instance);

    let states = [
        vec![0, 3, 6, 8],
        vec![1, 2, 7, 8],
        vec![2, 3, 6, 7, 8],
        vec![3, 4, 7],
        vec![2, 5, 6],
    ]
    .into_iter()
    .map(|ids| State::new(instance.clone(), ids.into_iter().map(|i| atoms[i])))
    .collect::<Result<Vec<_>, _>>()?;

    Ok((ElementFactory::new(vocabulary), states))
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    println!("args = {:?}", args);

    let config = match &args.config {
        Some(path) => GeneratorConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => GeneratorConfig::new()
            .with_limits(
                args.concept_limit,
                args.role_limit,
                args.boolean_limit,
                args.count_limit,
                args.distance_limit,
            )
            .with_time_limit_secs(args.time_limit)
            .with_feature_limit(args.feature_limit)
            .with_parallel(args.parallel),
    };

    let mut generator = FeatureGenerator::with_config(config);
    if !args.all_rules && args.config.is_none() {
        generator
            .rules_mut()
            .set_generate_inclusion_boolean(false)
            .set_generate_diff_concept(false)
            .set_generate_or_concept(false)
            .set_generate_subset_concept(false)
            .set_generate_and_role(false)
            .set_generate_compose_role(false)
            .set_generate_diff_role(false)
            .set_generate_identity_role(false)
            .set_generate_not_role(false)
            .set_generate_or_role(false)
            .set_generate_top_role(false)
            .set_generate_transitive_reflexive_closure_role(false);
    }
    info!("disabled rules: {:?}", generator.config().rules.disabled().collect::<Vec<_>>());

    let (factory, states) = blocks()?;
    let generation = generator.run(&factory, &states)?;

    for feature in &generation.features {
        println!("{}", feature);
    }
    println!(
        "{} features, status: {:?}, factory: {:?}",
        generation.features.len(),
        generation.status,
        factory
    );
    if args.stats {
        println!("{}", generation.statistics);
    }

    Ok(())
}
