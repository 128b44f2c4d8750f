use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};

use pairalign::align::{self, AlignMode, AlignmentResult, ScoringScheme};
use pairalign::io::{client, fasta, server, wire};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(
    name = "pairalign",
    author,
    version,
    about = "Needleman-Wunsch / Smith-Waterman pairwise aligner",
    arg_required_else_help = true
)]
struct Cli {
    /// Log verbosity: 1=error, 2=warn, 3=info, 4=debug, 5+=trace
    #[arg(short = 'v', long = "verbosity", default_value_t = 2, global = true)]
    verbosity: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone, Copy)]
struct ScoringArgs {
    #[arg(long = "match", default_value_t = 1, allow_negative_numbers = true)]
    match_score: i32,
    #[arg(long = "mismatch", default_value_t = -1, allow_negative_numbers = true)]
    mismatch_score: i32,
    #[arg(long = "gap", default_value_t = -1, allow_negative_numbers = true)]
    gap: i32,
}

impl From<ScoringArgs> for ScoringScheme {
    fn from(a: ScoringArgs) -> Self {
        ScoringScheme::new(a.match_score, a.mismatch_score, a.gap)
    }
}

#[derive(Args, Debug, Clone, Copy)]
struct OutputArgs {
    /// Which alignment(s) to compute
    #[arg(long, value_enum, default_value_t = ModeArg::Both)]
    mode: ModeArg,
    /// Print the wire response line instead of the readable report (always both modes)
    #[arg(long)]
    wire: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ModeArg {
    Global,
    Local,
    Both,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Align two sequences given on the command line
    Align {
        seq1: String,
        seq2: String,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        scoring: ScoringArgs,
    },
    /// Align the first record of each of two FASTA files
    AlignFasta {
        fasta1: PathBuf,
        fasta2: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        scoring: ScoringArgs,
    },
    /// Connect to a peer, answer one alignment request, and exit
    Client {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(short, long, default_value_t = 65432)]
        port: u16,
        /// Source label prepended to the response
        #[arg(long, default_value = "Rust")]
        label: String,
        /// Maximum request size in bytes
        #[arg(long = "max-payload", default_value_t = 4096)]
        max_payload: usize,
        /// Maximum number of score-matrix cells per request
        #[arg(long = "max-cells", default_value_t = 50_000_000)]
        max_cells: u128,
        /// Silence after the first request bytes that ends the request; 0 waits for close
        #[arg(long = "idle-timeout-ms", default_value_t = 250)]
        idle_timeout_ms: u64,
        #[command(flatten)]
        scoring: ScoringArgs,
    },
    /// Send one request to connecting clients, pick the best response, forward it to a sink
    Broadcast {
        seq1: String,
        seq2: String,
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
        #[arg(short, long, default_value_t = 65432)]
        port: u16,
        /// Number of valid responses to collect
        #[arg(long, default_value_t = 3)]
        clients: usize,
        /// Address that receives the best response followed by <END>
        #[arg(long, default_value = "127.0.0.1:65433")]
        sink: String,
        /// Print the best response without forwarding it
        #[arg(long = "no-sink")]
        no_sink: bool,
        /// Maximum response size in bytes
        #[arg(long = "max-response", default_value_t = 1 << 20)]
        max_response: usize,
    },
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        v if v <= 1 => log::LevelFilter::Error,
        2 => log::LevelFilter::Warn,
        3 => log::LevelFilter::Info,
        4 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbosity);

    match cli.command {
        Commands::Align {
            seq1,
            seq2,
            output,
            scoring,
        } => run_align(seq1.as_bytes(), seq2.as_bytes(), output, scoring.into()),
        Commands::AlignFasta {
            fasta1,
            fasta2,
            output,
            scoring,
        } => {
            let r1 = fasta::read_first_record(&fasta1)?;
            let r2 = fasta::read_first_record(&fasta2)?;
            log::info!(
                "aligning '{}' ({} bp) against '{}' ({} bp)",
                r1.id,
                r1.seq.len(),
                r2.id,
                r2.seq.len()
            );
            run_align(&r1.seq, &r2.seq, output, scoring.into())
        }
        Commands::Client {
            host,
            port,
            label,
            max_payload,
            max_cells,
            idle_timeout_ms,
            scoring,
        } => {
            let config = client::ClientConfig {
                host,
                port,
                label,
                max_payload,
                max_cells,
                idle_timeout: Duration::from_millis(idle_timeout_ms),
            };
            client::run_client(&config, scoring.into())?;
            Ok(())
        }
        Commands::Broadcast {
            seq1,
            seq2,
            bind,
            port,
            clients,
            sink,
            no_sink,
            max_response,
        } => {
            let config = server::BroadcastConfig {
                bind,
                port,
                clients,
                sink: (!no_sink).then_some(sink),
                max_response,
            };
            let best = server::broadcast(&config, &wire::AlignRequest::new(seq1, seq2))?;
            print!("{}", best.render());
            Ok(())
        }
    }
}

fn run_align(seq1: &[u8], seq2: &[u8], output: OutputArgs, scheme: ScoringScheme) -> Result<()> {
    if output.wire {
        let (g, l) = align::align_both(seq1, seq2, scheme);
        println!("{}", wire::format_response(&g, &l));
        return Ok(());
    }

    match output.mode {
        ModeArg::Both => {
            let (g, l) = align::align_both(seq1, seq2, scheme);
            print!("{}", wire::ResponseReport::new(None, &g, &l).render());
        }
        ModeArg::Global => {
            print_variant(AlignMode::Global, &align::align_global(seq1, seq2, scheme))
        }
        ModeArg::Local => print_variant(AlignMode::Local, &align::align_local(seq1, seq2, scheme)),
    }
    Ok(())
}

fn print_variant(mode: AlignMode, result: &AlignmentResult) {
    let mut out = String::new();
    wire::VariantReport::from(result).write_summary(mode.name(), &mut out);
    print!("{}", out);
}
