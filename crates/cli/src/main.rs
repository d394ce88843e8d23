use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use futures_util::stream::{self, StreamExt};
use pipeline::{FeatureBuilder, FEATURE_NAMES};
use resolver::{PlayerOutcome, UnresolvedPlayer};
use scoring::ScoringPort;
use server::{load_scoring_port, RecommendationOrchestrator, RecommendationReport, Settings};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;
use upstream::{MatchContext, MatchId, PlayerContext, PlayerId};

/// Fantasy Recs - Fantasy player recommendation service tools
#[derive(Parser)]
#[command(name = "fantasy-recs")]
#[command(
    about = "Rank fantasy players for a match and inspect the scoring pipeline",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

/// Flags that override the environment configuration
#[derive(Args)]
struct Overrides {
    /// Base URL of the match data service
    #[arg(long, global = true)]
    match_service_url: Option<String>,

    /// Base URL of the team (player stats) service
    #[arg(long, global = true)]
    team_service_url: Option<String>,

    /// Path to the model artifact
    #[arg(long, global = true)]
    model_path: Option<PathBuf>,

    /// Per-request upstream timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Maximum player stats fetches in flight per request
    #[arg(long, global = true)]
    max_concurrent_fetches: Option<usize>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

impl Overrides {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(url) = self.match_service_url {
            settings.match_service_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = self.team_service_url {
            settings.team_service_url = url.trim_end_matches('/').to_string();
        }
        if let Some(path) = self.model_path {
            settings.model_path = path;
        }
        if let Some(ms) = self.timeout_ms {
            settings.upstream_timeout = Duration::from_millis(ms.max(1));
        }
        if let Some(n) = self.max_concurrent_fetches {
            settings.max_concurrent_fetches = n.max(1);
        }
        if let Some(level) = self.log_level {
            settings.logging.level = level;
        }
        settings
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Rank players for a match
    Recommend {
        /// Match to recommend for
        #[arg(long)]
        match_id: MatchId,

        /// Candidate player IDs (comma-separated or repeated)
        #[arg(long, required = true, num_args = 1.., value_delimiter = ',')]
        player_ids: Vec<PlayerId>,

        /// List players that were dropped and why
        #[arg(long)]
        explain: bool,
    },

    /// Show what the upstream services return and the resulting features
    Inspect {
        /// Match to inspect
        #[arg(long)]
        match_id: MatchId,

        /// Player IDs to resolve (comma-separated or repeated)
        #[arg(long, num_args = 1.., value_delimiter = ',')]
        player_ids: Vec<PlayerId>,
    },

    /// Score one feature row against the model artifact, offline
    Score {
        /// Weather condition (default applies when omitted)
        #[arg(long)]
        weather: Option<f64>,

        /// Pitch condition (default applies when omitted)
        #[arg(long)]
        pitch: Option<f64>,

        /// Historical average points (default applies when omitted)
        #[arg(long)]
        avg_points: Option<f64>,
    },

    /// Run benchmark to test end-to-end latency
    Benchmark {
        /// Match to recommend for
        #[arg(long)]
        match_id: MatchId,

        /// Candidate player IDs (comma-separated or repeated)
        #[arg(long, required = true, num_args = 1.., value_delimiter = ',')]
        player_ids: Vec<PlayerId>,

        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let settings = cli
        .overrides
        .apply(Settings::from_env().context("Reading configuration")?);
    settings.logging.init()?;
    debug!(?settings, "Resolved settings");

    match cli.command {
        Commands::Recommend {
            match_id,
            player_ids,
            explain,
        } => handle_recommend(&settings, match_id, &player_ids, explain).await?,
        Commands::Inspect {
            match_id,
            player_ids,
        } => handle_inspect(&settings, match_id, &player_ids).await?,
        Commands::Score {
            weather,
            pitch,
            avg_points,
        } => handle_score(&settings, weather, pitch, avg_points)?,
        Commands::Benchmark {
            match_id,
            player_ids,
            requests,
            concurrent,
        } => handle_benchmark(&settings, match_id, player_ids, requests, concurrent).await?,
    }

    Ok(())
}

fn build_orchestrator(
    settings: &Settings,
    scoring: Arc<ScoringPort>,
) -> Result<RecommendationOrchestrator> {
    RecommendationOrchestrator::from_settings(settings, scoring)
        .context("Failed to set up upstream clients")
}

/// Handle the 'recommend' command
async fn handle_recommend(
    settings: &Settings,
    match_id: MatchId,
    player_ids: &[PlayerId],
    explain: bool,
) -> Result<()> {
    let orchestrator = build_orchestrator(settings, load_scoring_port(&settings.model_path))?;

    let start = Instant::now();
    let report = orchestrator.recommend(match_id, player_ids).await?;

    print_report(&report, explain);
    println!("{} Ranked in {:?}", "✓".green(), start.elapsed());
    Ok(())
}

/// Handle the 'inspect' command
async fn handle_inspect(
    settings: &Settings,
    match_id: MatchId,
    player_ids: &[PlayerId],
) -> Result<()> {
    // Inspection never scores, so the model is not loaded
    let orchestrator = build_orchestrator(settings, Arc::new(ScoringPort::new()))?;
    let resolution = orchestrator.resolver().resolve(match_id, player_ids).await?;

    let context = &resolution.match_context;
    println!("{}", format!("Match ID: {}", context.match_id).bold().blue());
    println!("{}Weather condition: {}", "• ".green(), show(context.weather_condition));
    println!("{}Pitch condition: {}", "• ".green(), show(context.pitch_condition));

    let builder = FeatureBuilder::new();
    println!("{}", "Players:".bold());
    for outcome in &resolution.outcomes {
        match outcome {
            PlayerOutcome::Resolved(player) => {
                let features = builder.build(context, player);
                println!(
                    "  {} {} avg points {} -> features {:?}",
                    "✓".green(),
                    player.player_id,
                    show(player.historical_avg_points),
                    features.to_array()
                );
            }
            PlayerOutcome::Unresolved(player) => {
                println!("  {} {} {}", "✗".red(), player.player_id, player.reason);
            }
        }
    }
    Ok(())
}

/// Handle the 'score' command
fn handle_score(
    settings: &Settings,
    weather: Option<f64>,
    pitch: Option<f64>,
    avg_points: Option<f64>,
) -> Result<()> {
    let port = ScoringPort::new();
    port.bind_from_path(&settings.model_path)
        .with_context(|| format!("Failed to load model from {}", settings.model_path.display()))?;

    let match_context = MatchContext {
        match_id: 0,
        weather_condition: weather,
        pitch_condition: pitch,
    };
    let player = PlayerContext {
        player_id: 0,
        historical_avg_points: avg_points,
    };
    let features = FeatureBuilder::new().build(&match_context, &player);

    println!(
        "{}",
        format!("Model: {}", port.model_name().unwrap_or("unknown")).bold().blue()
    );
    for (name, value) in FEATURE_NAMES.iter().zip(features.to_array()) {
        println!("{}{}: {}", "• ".green(), name, value);
    }

    let score = port.score(&features)?;
    println!("Predicted score: {:.2}", pipeline::round_score(score));
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    settings: &Settings,
    match_id: MatchId,
    player_ids: Vec<PlayerId>,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 || player_ids.is_empty() {
        return Err(anyhow!("Benchmark needs at least one request and one player"));
    }

    let orchestrator = build_orchestrator(settings, load_scoring_port(&settings.model_path))?;
    if !orchestrator.scoring().is_ready() {
        return Err(anyhow!(
            "Model at {} could not be loaded",
            settings.model_path.display()
        ));
    }

    // Rotate the candidate list per request so tie-breaking varies
    let wall = Instant::now();
    let results: Vec<_> = stream::iter(0..requests)
        .map(|_| {
            let orchestrator = orchestrator.clone();
            let mut ids = player_ids.clone();
            ids.rotate_left(rand::random::<u32>() as usize % player_ids.len());
            async move {
                let start = Instant::now();
                orchestrator
                    .recommend(match_id, &ids)
                    .await
                    .map(|_| start.elapsed())
            }
        })
        .buffer_unordered(concurrent.max(1))
        .collect()
        .await;
    let wall_time = wall.elapsed();

    let mut timings = Vec::with_capacity(results.len());
    let mut failures = 0;
    for result in results {
        match result {
            Ok(elapsed) => timings.push(elapsed),
            Err(e) => {
                debug!("Benchmark request failed: {}", e);
                failures += 1;
            }
        }
    }
    if timings.is_empty() {
        return Err(anyhow!("All {} requests failed", requests));
    }

    timings.sort();
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;
    let throughput = requests as f64 / wall_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} failed)", requests, failures);
    println!("Total time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(&timings, 0.50));
    println!("P95 latency: {:?}", percentile(&timings, 0.95));
    println!("P99 latency: {:?}", percentile(&timings, 0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Nearest-rank percentile of an ascending, non-empty slice
fn percentile(sorted: &[Duration], p: f64) -> Duration {
    let rank = (sorted.len() as f64 * p).ceil() as usize;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}

fn show(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "missing".to_string())
}

/// Helper function to format and print a ranked report
fn print_report(report: &RecommendationReport, explain: bool) {
    println!(
        "{}",
        format!("Recommendations for match {}:", report.match_id).bold().blue()
    );
    if report.recommendations.is_empty() {
        println!("  (no players could be scored)");
    }
    for (i, rec) in report.recommendations.iter().enumerate() {
        println!(
            "{}. Player {} - Score: {:.2}",
            (i + 1).to_string().green(),
            rec.player_id,
            rec.predicted_score
        );
    }

    if explain {
        print_unresolved(&report.unresolved);
    }
}

fn print_unresolved(unresolved: &[UnresolvedPlayer]) {
    if unresolved.is_empty() {
        println!("{}", "Every candidate was scored.".dimmed());
        return;
    }
    println!("{}", "Dropped players:".bold().yellow());
    for player in unresolved {
        println!("  - Player {}: {}", player.player_id, player.reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_nearest_rank() {
        let timings: Vec<Duration> = (1..=100).map(Duration::from_millis).collect();

        assert_eq!(percentile(&timings, 0.50), Duration::from_millis(50));
        assert_eq!(percentile(&timings, 1.0), Duration::from_millis(100));
        assert_eq!(percentile(&timings[..1], 0.95), Duration::from_millis(1));
    }

    #[test]
    fn test_overrides_replace_settings() {
        let cli = Cli::parse_from([
            "fantasy-recs",
            "--match-service-url",
            "http://matches:9000/api/v1/",
            "--timeout-ms",
            "250",
            "recommend",
            "--match-id",
            "10",
            "--player-ids",
            "1,2",
            "--player-ids",
            "3",
        ]);

        let settings = cli.overrides.apply(Settings::default());
        assert_eq!(settings.match_service_url, "http://matches:9000/api/v1");
        assert_eq!(settings.upstream_timeout, Duration::from_millis(250));

        match cli.command {
            Commands::Recommend { player_ids, .. } => assert_eq!(player_ids, vec![1, 2, 3]),
            _ => panic!("expected recommend"),
        }
    }
}
