//! Command-line harness around the cuescan library.
//!
//! Two subcommands:
//!
//! - `bench`: time the automaton against the per-pattern baseline over the
//!   eligible turns of a transcripts file, at several pattern counts k.
//! - `inspect`: print the cues detected on each eligible agent turn.

use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use cuescan::{
    compile_patterns, eligible_turns, expand_to_k, load_raw_cues, parse_transcripts,
    BaselineMatcher, CueAutomaton,
};

#[derive(Parser)]
#[command(name = "cue-bench", about = "Repair-cue detection over transcripts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare automaton vs baseline matcher timing as k grows
    Bench {
        /// Path to the transcripts file
        #[arg(long)]
        transcripts: PathBuf,
        /// Path to the cue catalog file
        #[arg(long)]
        cues: PathBuf,
        /// Comma-separated pattern counts to benchmark at
        #[arg(long, default_value = "10,50,200")]
        k: String,
        /// Iterations over the eligible turns per measurement
        #[arg(long, default_value_t = 1000)]
        iterations: usize,
    },
    /// Print detected cues on eligible agent turns
    Inspect {
        /// Path to the transcripts file
        #[arg(long)]
        transcripts: PathBuf,
        /// Path to the cue catalog file
        #[arg(long)]
        cues: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Bench {
            transcripts,
            cues,
            k,
            iterations,
        } => {
            let k_values = parse_k_list(&k)?;
            run_bench(&transcripts, &cues, &k_values, iterations)?;
        }
        Command::Inspect { transcripts, cues } => {
            run_inspect(&transcripts, &cues)?;
        }
    }
    Ok(())
}

fn parse_k_list(raw: &str) -> Result<Vec<usize>, Box<dyn Error>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| format!("invalid k value: {:?}", s).into())
        })
        .collect()
}

/// Average milliseconds per turn for one matcher over all eligible texts.
///
/// The match count is folded into the return value's computation so the
/// search calls cannot be optimized away.
fn ms_per_turn(texts: &[&str], iterations: usize, mut find: impl FnMut(&str) -> usize) -> f64 {
    if texts.is_empty() || iterations == 0 {
        return 0.0;
    }
    let start = Instant::now();
    let mut total_matches = 0usize;
    for _ in 0..iterations {
        for &text in texts {
            total_matches += find(text);
        }
    }
    let elapsed = start.elapsed();
    log::debug!("{} matches across {} iterations", total_matches, iterations);

    let total_turns = (texts.len() * iterations) as f64;
    elapsed.as_secs_f64() * 1000.0 / total_turns
}

fn run_bench(
    transcripts: &PathBuf,
    cues: &PathBuf,
    k_values: &[usize],
    iterations: usize,
) -> Result<(), Box<dyn Error>> {
    let conversations = parse_transcripts(transcripts)?;
    let eligible = eligible_turns(&conversations);
    let texts: Vec<&str> = eligible
        .iter()
        .map(|(conv, idx)| conv.turns[*idx].text.as_str())
        .collect();

    if texts.is_empty() {
        println!("No eligible agent turns found (agent after patient).");
        return Ok(());
    }

    let base_patterns = compile_patterns(&load_raw_cues(cues)?);
    log::info!(
        "loaded {} conversations, {} eligible turns, {} base cues",
        conversations.len(),
        texts.len(),
        base_patterns.len()
    );

    println!(
        "Loaded {} conversations and {} eligible agent turns.",
        conversations.len(),
        texts.len()
    );
    println!("Base cue patterns: {}", base_patterns.len());
    println!();
    println!(
        "{:>5} | {:>10} | {:>10} | {:>20}",
        "k", "method", "ms/turn", "speedup_vs_baseline"
    );
    println!("{}", "-".repeat(56));

    for &k in k_values {
        let patterns_k = expand_to_k(&base_patterns, k);

        let automaton = CueAutomaton::build(patterns_k.clone())?;
        let baseline = BaselineMatcher::new(patterns_k)?;
        log::info!("k={}: automaton has {} nodes", k, automaton.node_count());

        let ms_automaton = ms_per_turn(&texts, iterations, |t| automaton.find_all(t).len());
        let ms_baseline = ms_per_turn(&texts, iterations, |t| baseline.find_all(t).len());
        let speedup = if ms_automaton > 0.0 {
            ms_baseline / ms_automaton
        } else {
            f64::INFINITY
        };

        println!(
            "{:>5} | {:>10} | {:>10.4} | {:>20}",
            k, "automaton", ms_automaton, "-"
        );
        println!(
            "{:>5} | {:>10} | {:>10.4} | {:>20.2}",
            k, "baseline", ms_baseline, speedup
        );
        println!("{}", "-".repeat(56));
    }
    Ok(())
}

fn run_inspect(transcripts: &PathBuf, cues: &PathBuf) -> Result<(), Box<dyn Error>> {
    let conversations = parse_transcripts(transcripts)?;
    let patterns = compile_patterns(&load_raw_cues(cues)?);
    let automaton = CueAutomaton::build(patterns)?;

    for (conv, idx) in eligible_turns(&conversations) {
        let turn = &conv.turns[idx];
        let matches = automaton.find_all(&turn.text);
        if matches.is_empty() {
            continue;
        }
        println!("Conversation {}, agent turn {}: {}", conv.id, idx, turn.text);
        for m in matches {
            println!("  - [{}] {}", m.pattern.category, m.pattern.raw_phrase);
        }
        println!();
    }
    Ok(())
}
