//! Example: Evaluate many estimate files in parallel
//!
//! Usage:
//!   cargo run --release --example evaluate_batch -- [--jobs N] [--json] [--ci]
//!       [--metrics fMeasure,pScore] [--config config.json]
//!       <annotations1> <estimates1> <annotations2> <estimates2> ...
//!
//! Notes:
//! - Parallelism is across files. Each file is scored on a single thread.
//! - Default workers: (available CPU threads - 1), keeping one core free for the system.
//! - `--config` loads an `EvaluationConfig` from JSON; missing fields keep their defaults.

use rayon::prelude::*;
use std::collections::BTreeMap;
use std::env;
use std::time::Instant;
use stratum_eval::io::beat_list::read_beat_list;
use stratum_eval::{evaluate_corpus, EvaluationConfig, EvaluationError, MetricKind};

fn default_jobs() -> usize {
    let n = std::thread::available_parallelism().map(|v| v.get()).unwrap_or(1);
    std::cmp::max(1, n.saturating_sub(1))
}

fn load_config(path: Option<&str>) -> Result<EvaluationConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => EvaluationConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut json = false;
    let mut with_confidence = false;
    let mut jobs: Option<usize> = None;
    let mut metric_names: Vec<String> = vec!["all".to_string()];
    let mut config_path: Option<String> = None;
    let mut paths: Vec<String> = Vec::new();

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--json" => json = true,
            "--ci" => with_confidence = true,
            "--jobs" => {
                let v = args
                    .first()
                    .ok_or("--jobs requires a value")?
                    .parse::<usize>()?;
                args.remove(0);
                jobs = Some(std::cmp::max(1, v));
            }
            "--metrics" => {
                let v = args.first().ok_or("--metrics requires a value")?;
                metric_names = v.split(',').map(|s| s.trim().to_string()).collect();
                args.remove(0);
            }
            "--config" => {
                config_path = Some(args.first().ok_or("--config requires a path")?.clone());
                args.remove(0);
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: evaluate_batch [options] <annotations1> <estimates1> ...\n\
                     \n\
                     --jobs N         Parallel workers (default: CPU-1)\n\
                     --json           Emit one JSON object per line (JSONL)\n\
                     --ci             Bootstrap confidence intervals for the corpus means\n\
                     --metrics LIST   Comma-separated metric names, or 'all' (default)\n\
                     --config FILE    JSON evaluation config\n"
                );
                return Ok(());
            }
            _ => paths.push(a),
        }
    }

    if paths.is_empty() || paths.len() % 2 != 0 {
        eprintln!("ERROR: Provide annotation/estimate file pairs. Use --help for usage.");
        std::process::exit(2);
    }

    let metrics = MetricKind::parse_selection(metric_names.as_slice())?;
    let config = load_config(config_path.as_deref())?;
    let jobs = jobs.unwrap_or_else(default_jobs);
    let pairs: Vec<(&String, &String)> = paths
        .chunks(2)
        .map(|pair| (&pair[0], &pair[1]))
        .collect();
    eprintln!("Batch: {} file pairs, jobs={}", pairs.len(), jobs);

    let t0 = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    let corpus = pool.install(|| -> Result<_, EvaluationError> {
        let loaded: Vec<(Vec<f64>, Vec<f64>)> = pairs
            .par_iter()
            .map(
                |(annotation_path, estimate_path)| -> Result<_, EvaluationError> {
                    Ok((read_beat_list(annotation_path)?, read_beat_list(estimate_path)?))
                },
            )
            .collect::<Result<_, _>>()?;
        let (annotations, estimates): (Vec<_>, Vec<_>) = loaded.into_iter().unzip();
        evaluate_corpus(&annotations, &estimates, &metrics, with_confidence, &config)
    })?;

    for (idx, (file, (_, estimate_path))) in corpus.files.iter().zip(&pairs).enumerate() {
        if json {
            let scores: BTreeMap<&str, f64> = file.scores().into_iter().collect();
            let flags: Vec<String> = file
                .flags
                .iter()
                .map(|flag| format!("{}: {}", flag.metric, flag.rejection))
                .collect();
            println!(
                "{{\"file\":{},\"scores\":{},\"flags\":{}}}",
                serde_json::to_string(estimate_path)?,
                serde_json::to_string(&scores)?,
                serde_json::to_string(&flags)?
            );
        } else {
            let line: Vec<String> = file
                .scores()
                .iter()
                .map(|(name, score)| format!("{}={:.2}", name, score))
                .collect();
            println!(
                "[{}/{}] {}: {}{}",
                idx + 1,
                corpus.files.len(),
                estimate_path,
                line.join(" "),
                if file.has_flags() { " (floored)" } else { "" }
            );
        }
    }

    if json {
        println!(
            "{{\"summary\":{},\"metadata\":{}}}",
            serde_json::to_string(&corpus.metrics)?,
            serde_json::to_string(&corpus.metadata)?
        );
    } else {
        println!("Corpus means:");
        for key in corpus.keys() {
            if let Some(summary) = corpus.summary(key) {
                match summary.confidence_interval {
                    Some(ci) => println!(
                        "  {:<10} {:.4}  [{:.4}, {:.4}]",
                        key, summary.mean, ci.lower, ci.upper
                    ),
                    None => println!("  {:<10} {:.4}", key, summary.mean),
                }
            }
        }
    }

    eprintln!(
        "Done: files={} flagged={} wall={:.0}ms",
        corpus.metadata.file_count,
        corpus.metadata.flagged_files,
        t0.elapsed().as_secs_f64() * 1000.0
    );

    Ok(())
}
