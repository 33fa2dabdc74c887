//! Example: Evaluate one estimate file against its annotation file
//!
//! Usage:
//!   cargo run --example evaluate_pair -- [--downbeats] <annotations.txt> <estimates.txt>
//!
//! Both files are beat lists: one time in seconds per line.

use std::env;
use stratum_eval::io::beat_list::read_beat_list;
use stratum_eval::{evaluate_beats, evaluate_downbeats, EvaluationConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut downbeats = false;
    let mut paths: Vec<String> = Vec::new();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--downbeats" => downbeats = true,
            "--help" | "-h" => {
                eprintln!("Usage: evaluate_pair [--downbeats] <annotations.txt> <estimates.txt>");
                return Ok(());
            }
            _ => paths.push(arg),
        }
    }

    let (annotation_path, estimate_path) = match paths.as_slice() {
        [a, e] => (a, e),
        _ => {
            eprintln!("ERROR: Provide exactly two beat-list files. Use --help for usage.");
            std::process::exit(2);
        }
    };

    let annotations = read_beat_list(annotation_path)?;
    let estimates = read_beat_list(estimate_path)?;
    let config = EvaluationConfig::default();

    println!("Evaluation Results:");
    println!("  Annotations: {} ({} events)", annotation_path, annotations.len());
    println!("  Estimates:   {} ({} events)", estimate_path, estimates.len());

    if downbeats {
        let result = evaluate_downbeats(&annotations, &estimates, &config);
        println!("  Downbeat accuracy: {:.2}", result.score);
        for (position, score) in result.bar_position_scores.iter().enumerate() {
            println!("    downbeat on beat {}: {:.2}", position + 1, score);
        }
        println!("    double time: {:.2}", result.double_time);
        println!("    half time:   {:.2}", result.half_time);
        return Ok(());
    }

    let result = evaluate_beats(&annotations, &estimates, &config);
    for (name, score) in result.scores() {
        println!("  {:<10} {:.4}", name, score);
    }
    for flag in &result.flags {
        println!("  [floor] {}: {}", flag.metric, flag.rejection);
    }

    Ok(())
}
