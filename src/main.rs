use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

use conjecturing::cancel::{CancellationToken, StopReason};
use conjecturing::error::{ConjectureError, Result};
use conjecturing::parser::{self, DatasetOptions};
use conjecturing::printer::{ExpressionPrinter, OutputFormat};
use conjecturing::search::{
    self, Comparator, Heuristic, SearchConfig, SearchStatistics, MAX_BINARY_LIMIT,
    MAX_UNARY_LIMIT,
};
use conjecturing::semantics::{
    OperatorSet, OperatorTable, MAX_INVARIANT_COUNT, MAX_OBJECT_COUNT, NUMERIC_OPERATORS,
    PROPERTY_OPERATORS,
};
use conjecturing::tree::{count_shapes, enumerate_shapes, Arity, ShapeBudget, Tree};

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "conjecturing")]
#[command(about = "conjecturing - invariant-based conjecture generator")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// CLI comparator selection
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliComparator {
    /// expression <= main invariant
    Leq,
    /// expression < main invariant
    Less,
    /// expression >= main invariant
    Geq,
    /// expression > main invariant
    Greater,
    /// expression implies main property
    Sufficient,
    /// main property implies expression
    Necessary,
}

impl From<CliComparator> for Comparator {
    fn from(cli: CliComparator) -> Self {
        match cli {
            CliComparator::Leq => Comparator::Leq,
            CliComparator::Less => Comparator::Less,
            CliComparator::Geq => Comparator::Geq,
            CliComparator::Greater => Comparator::Greater,
            CliComparator::Sufficient => Comparator::Sufficient,
            CliComparator::Necessary => Comparator::Necessary,
        }
    }
}

/// CLI heuristic selection
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliHeuristic {
    /// Report every true expression
    None,
    /// Keep expressions that are the tightest bound for some object
    Dalmatian,
    /// Keep the single expression closest to the main invariant
    Grinvin,
}

impl From<CliHeuristic> for Heuristic {
    fn from(cli: CliHeuristic) -> Self {
        match cli {
            CliHeuristic::None => Heuristic::None,
            CliHeuristic::Dalmatian => Heuristic::Dalmatian,
            CliHeuristic::Grinvin => Heuristic::Grinvin,
        }
    }
}

/// CLI output format selection
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliOutput {
    /// One infix conjecture per line
    Readable,
    /// Postorder tokens, one per line, conjectures separated by empty lines
    Stack,
}

impl From<CliOutput> for OutputFormat {
    fn from(cli: CliOutput) -> Self {
        match cli {
            CliOutput::Readable => OutputFormat::Readable,
            CliOutput::Stack => OutputFormat::Stack,
        }
    }
}

/// CLI limit selection
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CliLimit {
    /// Every limit
    All,
    /// Unary operators per expression
    Unary,
    /// Binary operators per expression
    Binary,
    /// Objects per dataset
    Objects,
    /// Invariants per dataset
    Invariants,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for conjectures about the main invariant of a dataset
    Conjecture {
        /// Dataset file, or - for standard input
        dataset: PathBuf,
        /// File selecting the operators to use (default: all of the mode)
        #[arg(long, conflicts_with = "inline_operators")]
        operators: Option<PathBuf>,
        /// The operator selection precedes the dataset in the same input
        #[arg(long)]
        inline_operators: bool,
        /// Use every built-in operator of the mode
        #[arg(long, conflicts_with_all = ["operators", "inline_operators"])]
        all_operators: bool,
        /// Relation between expression and main invariant
        #[arg(long, value_enum, default_value = "leq")]
        comparator: CliComparator,
        /// Conjecture selection heuristic
        #[arg(long, value_enum, default_value = "dalmatian")]
        heuristic: CliHeuristic,
        /// Maximum number of unary operators per expression
        #[arg(long, short = 'u', default_value_t = MAX_UNARY_LIMIT)]
        max_unary: usize,
        /// Maximum number of binary operators per expression
        #[arg(long, short = 'b', default_value_t = MAX_BINARY_LIMIT)]
        max_binary: usize,
        /// Time limit in seconds (0 = no limit)
        #[arg(long, default_value = "0")]
        time: u64,
        /// Dataset lists one invariant name per line after the header
        #[arg(long)]
        invariant_names: bool,
        /// Dataset lists one known-theory value per object
        #[arg(long)]
        theory: bool,
        /// Allow the main invariant inside its own bounds
        #[arg(long)]
        allow_main_invariant: bool,
        /// Largest share of objects an expression may skip
        #[arg(long, default_value = "0.2")]
        skips: f64,
        /// Output format
        #[arg(long, value_enum, default_value = "readable")]
        output: CliOutput,
        /// Log search progress and print statistics to stderr
        #[arg(long, short)]
        verbose: bool,
    },
    /// Count (or list) the tree shapes of one operator budget
    Shapes {
        /// Number of unary operators
        #[arg(long, short = 'u', default_value = "0")]
        unary: usize,
        /// Number of binary operators
        #[arg(long, short = 'b', default_value = "0")]
        binary: usize,
        /// Print every shape as its postorder arity string
        #[arg(long)]
        list: bool,
    },
    /// Print the size limits of this build as KEY:value lines
    Limits {
        #[arg(value_enum, default_value = "all")]
        which: CliLimit,
    },
}

/// Where the operator selection comes from
enum OperatorSource {
    /// Every built-in operator of the mode
    All,
    File(PathBuf),
    /// Operator records before the dataset in the same input
    Inline,
}

struct ConjectureOptions {
    dataset: PathBuf,
    operators: OperatorSource,
    dataset_options: DatasetOptions,
    config: SearchConfig,
    output: OutputFormat,
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn install_interrupt_handler(cancel: &CancellationToken) {
    let token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        token.cancel(StopReason::Interrupted);
    }) {
        tracing::warn!("cannot install interrupt handler: {}", e);
    }
}

fn load_operators<V: 'static>(
    source: &OperatorSource,
    table: &OperatorTable<V>,
) -> Result<Option<OperatorSet>> {
    match source {
        OperatorSource::File(path) => {
            let text = parser::read_source(path)?;
            Ok(Some(parser::parse_operator_table(&text, table)?))
        }
        OperatorSource::All | OperatorSource::Inline => Ok(None),
    }
}

fn run_conjecture(options: ConjectureOptions) -> Result<()> {
    let cancel = CancellationToken::new();
    install_interrupt_handler(&cancel);

    let text = parser::read_source(&options.dataset)?;
    let inline = matches!(options.operators, OperatorSource::Inline);
    let mut stdout = io::stdout().lock();

    if options.config.comparator.is_property() {
        let (operators, dataset) = if inline {
            let (operators, dataset) =
                parser::parse_property_input(&text, &options.dataset_options)?;
            (Some(operators), dataset)
        } else {
            let operators = load_operators(&options.operators, &PROPERTY_OPERATORS)?;
            let dataset = parser::parse_property_dataset(&text, &options.dataset_options)?;
            (operators, dataset)
        };
        let config = match operators {
            Some(operators) => options.config.with_operators(operators),
            None => options.config,
        };
        let result = search::conjecture_property(&dataset, &config, &cancel)?;

        let symbol = config.comparator.property().map_or("->", |c| c.symbol());
        let printer = ExpressionPrinter::for_dataset(&PROPERTY_OPERATORS, &dataset, symbol);
        printer
            .write_all(&mut stdout, &result.conjectures, options.output)
            .map_err(|e| ConjectureError::io("<stdout>", e))?;
        report(&result.statistics, result.stop_reason, options.verbose);
    } else {
        let (operators, dataset) = if inline {
            let (operators, dataset) =
                parser::parse_numeric_input(&text, &options.dataset_options)?;
            (Some(operators), dataset)
        } else {
            let operators = load_operators(&options.operators, &NUMERIC_OPERATORS)?;
            let dataset = parser::parse_numeric_dataset(&text, &options.dataset_options)?;
            (operators, dataset)
        };
        let config = match operators {
            Some(operators) => options.config.with_operators(operators),
            None => options.config,
        };
        let result = search::conjecture_numeric(&dataset, &config, &cancel)?;

        let symbol = config.comparator.numeric().map_or("<=", |c| c.symbol());
        let printer = ExpressionPrinter::for_dataset(&NUMERIC_OPERATORS, &dataset, symbol);
        printer
            .write_all(&mut stdout, &result.conjectures, options.output)
            .map_err(|e| ConjectureError::io("<stdout>", e))?;
        report(&result.statistics, result.stop_reason, options.verbose);
    }
    Ok(())
}

/// Print search statistics
fn report(stats: &SearchStatistics, stop_reason: Option<StopReason>, verbose: bool) {
    if !verbose {
        return;
    }
    eprintln!("\nSearch Statistics:");
    match stop_reason {
        Some(reason) => eprintln!("Stopped: {}", reason),
        None => eprintln!("Stopped: schedule exhausted"),
    }
    eprint!("{}", stats.format_summary());
}

fn arity_char(arity: Arity) -> char {
    match arity {
        Arity::Leaf => 'L',
        Arity::Unary => 'U',
        Arity::Binary => 'B',
    }
}

fn run_shapes(unary: usize, binary: usize, list: bool) -> Result<()> {
    if unary > MAX_UNARY_LIMIT || binary > MAX_BINARY_LIMIT {
        return Err(ConjectureError::invalid_config(format!(
            "budget ({}, {}) exceeds limits ({}, {})",
            unary, binary, MAX_UNARY_LIMIT, MAX_BINARY_LIMIT
        )));
    }
    let budget = ShapeBudget::new(unary, binary);
    let count = if list {
        let mut tree = Tree::new(unary, binary);
        let cancel = CancellationToken::new();
        let mut count = 0u64;
        enumerate_shapes(&mut tree, budget, &cancel, &mut |tree: &mut Tree| {
            let shape: String = tree.postorder_arities().into_iter().map(arity_char).collect();
            println!("{}", shape);
            count += 1;
        });
        count
    } else {
        count_shapes(budget)
    };
    println!("{} shapes for {}", count, budget);
    Ok(())
}

fn run_limits(which: CliLimit) {
    let limits = [
        (CliLimit::Unary, "MAX_UNARY_COUNT", MAX_UNARY_LIMIT),
        (CliLimit::Binary, "MAX_BINARY_COUNT", MAX_BINARY_LIMIT),
        (CliLimit::Objects, "MAX_OBJECT_COUNT", MAX_OBJECT_COUNT),
        (CliLimit::Invariants, "MAX_INVARIANT_COUNT", MAX_INVARIANT_COUNT),
    ];
    for (limit, key, value) in limits {
        if which == CliLimit::All || which == limit {
            println!("{}:{}", key, value);
        }
    }
}

fn main() {
    let args = Args::parse();

    let outcome = match args.command {
        Commands::Conjecture {
            dataset,
            operators,
            inline_operators,
            all_operators: _,
            comparator,
            heuristic,
            max_unary,
            max_binary,
            time,
            invariant_names,
            theory,
            allow_main_invariant,
            skips,
            output,
            verbose,
        } => {
            init_logging(verbose);
            let config = SearchConfig::default()
                .with_max_unary(max_unary)
                .with_max_binary(max_binary)
                .with_comparator(comparator.into())
                .with_heuristic(heuristic.into())
                .with_timeout(Duration::from_secs(time))
                .with_main_invariant_allowed(allow_main_invariant)
                .with_allowed_skip_fraction(skips);

            // --all-operators only spells out the default
            let operators = match (operators, inline_operators) {
                (Some(path), _) => OperatorSource::File(path),
                (None, true) => OperatorSource::Inline,
                (None, false) => OperatorSource::All,
            };
            run_conjecture(ConjectureOptions {
                dataset,
                operators,
                dataset_options: DatasetOptions {
                    invariant_names,
                    known_theory: theory,
                },
                config,
                output: output.into(),
                verbose,
            })
        }
        Commands::Shapes {
            unary,
            binary,
            list,
        } => {
            init_logging(false);
            run_shapes(unary, binary, list)
        }
        Commands::Limits { which } => {
            run_limits(which);
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
