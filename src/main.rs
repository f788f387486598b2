use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use spotify_dedup::analytics::{
    calculate_dashboard_stats, calculate_genre_data, calculate_timeline_stats,
};
use spotify_dedup::dedup::largest_duplicate_groups;
use spotify_dedup::{
    AnalysisReport, Config, LibrarySnapshot, TrackGroup, TrackSource, compute_grouping_stats,
    group_tracks,
};

#[derive(Parser)]
#[command(name = "spotify-dedup")]
#[command(about = "Find the same song across your Spotify liked tracks and playlists")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Library snapshot JSON
    #[arg(short, long, global = true, env = "DEDUP_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Group the library and print deduplication and dashboard statistics
    Analyze {
        /// Save the full report as JSON
        #[arg(long)]
        save: bool,

        /// Length of the top artist/album/playlist lists
        #[arg(long)]
        top: Option<usize>,
    },

    /// List the largest groups of duplicate tracks
    Duplicates {
        /// Number of groups to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Show when songs were added, month by month
    Timeline,

    /// Show genre statistics
    Genres {
        /// Number of top genres
        #[arg(long)]
        top: Option<usize>,
    },
}

fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    // .env must be loaded before clap reads DEDUP_SNAPSHOT
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    let top = match &cli.command {
        Commands::Analyze { top, .. } | Commands::Genres { top } => *top,
        _ => None,
    };
    let config = Config::from_env()
        .context("Failed to load configuration")?
        .with_overrides(cli.snapshot, top);

    let missing = config.get_missing_config();
    if !missing.is_empty() {
        println!("{}", "Missing configuration:".red());
        for item in &missing {
            println!("   - {}", item);
        }
        println!(
            "\n{}",
            "Pass --snapshot <file> or set DEDUP_SNAPSHOT in .env".yellow()
        );
        std::process::exit(1);
    }

    let snapshot_path = config.snapshot_path.clone().unwrap_or_default();
    let snapshot = LibrarySnapshot::load(&snapshot_path)
        .with_context(|| format!("Failed to load snapshot {}", snapshot_path.display()))?;

    let groups = group_with_spinner(&snapshot);

    match cli.command {
        Commands::Analyze { save, .. } => analyze(&config, groups, save)?,
        Commands::Duplicates { limit } => list_duplicates(&groups, limit),
        Commands::Timeline => show_timeline(&groups),
        Commands::Genres { .. } => show_genres(&config, &snapshot, &groups),
    }

    Ok(())
}

fn group_with_spinner(snapshot: &LibrarySnapshot) -> Vec<TrackGroup> {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!(
        "Grouping {} tracks...",
        snapshot.occurrences.len()
    ));
    pb.enable_steady_tick(Duration::from_millis(100));

    let groups = group_tracks(&snapshot.occurrences);

    pb.finish_and_clear();
    groups
}

fn header(title: &str) {
    println!("{}", title.cyan().bold());
    println!("{}", "=".repeat(60));
}

fn analyze(config: &Config, groups: Vec<TrackGroup>, save: bool) -> Result<()> {
    let stats = compute_grouping_stats(&groups);
    let dashboard = calculate_dashboard_stats(&groups, config.top_n);

    header("DEDUPLICATION SUMMARY");
    println!("Total tracks: {}", stats.total_tracks);
    println!("Unique songs: {}", stats.total_groups.to_string().green());
    println!(
        "Duplicate groups: {} ({:.1}% of all songs)",
        stats.multi_track_groups.to_string().yellow(),
        stats.duplicate_group_rate()
    );
    println!("Largest group: {} instances of the same song", stats.largest_group);
    println!("Average group size: {:.2}", stats.average_group_size);
    println!("Match types:");
    println!("  Strict: {}", stats.strict_only_groups);
    println!("  Fuzzy:  {}", stats.fuzzy_only_groups);
    println!("  Both:   {}", stats.mixed_groups);

    println!();
    header("LIBRARY");
    println!(
        "Playlists: {} (avg {} tracks)",
        dashboard.playlist_count, dashboard.avg_tracks_per_playlist
    );

    println!("\nTop artists:");
    for (i, artist) in dashboard.top_artists.iter().enumerate() {
        println!("  {:2}. {} ({})", i + 1, artist.name.green(), artist.count);
    }

    println!("\nTop albums:");
    for (i, album) in dashboard.top_albums.iter().enumerate() {
        println!("  {:2}. {} ({})", i + 1, album.name.green(), album.count);
    }

    println!("\nMost playlisted:");
    for (i, song) in dashboard.most_playlisted.iter().enumerate() {
        println!(
            "  {:2}. {} - {} ({} playlists)",
            i + 1,
            song.track.name.green(),
            song.track.artist_names().join(", "),
            song.playlist_count
        );
    }

    if save {
        let report = AnalysisReport::new(config.snapshot_path.as_deref(), stats, dashboard, groups);
        let path = report
            .save(&config.results_dir)
            .context("Failed to save analysis report")?;
        println!("\n{} {}", "Report saved to".green(), path.display());
    }

    Ok(())
}

fn list_duplicates(groups: &[TrackGroup], limit: usize) {
    header("LARGEST DUPLICATE GROUPS");

    let largest = largest_duplicate_groups(groups, limit);
    if largest.is_empty() {
        println!("{}", "No duplicates found".yellow());
        return;
    }

    for (i, group) in largest.iter().enumerate() {
        let reasons: Vec<String> = group
            .match_reasons
            .criteria()
            .iter()
            .map(|c| c.to_string())
            .collect();

        println!(
            "{:2}. {} - {} [{} tracks, {}]",
            i + 1,
            group.representative_track.name.green(),
            group.representative_track.artist_names().join(", "),
            group.len(),
            reasons.join(" + ").cyan()
        );

        for occurrence in &group.tracks {
            let source = match &occurrence.source {
                TrackSource::Liked => "Liked Songs".to_string(),
                TrackSource::Playlist { playlist } => playlist.name.clone(),
            };
            println!(
                "      {} ({}) in {}",
                occurrence.track.name,
                format_duration(occurrence.track.duration_ms),
                source.yellow()
            );
        }
    }
}

fn format_duration(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn show_timeline(groups: &[TrackGroup]) {
    header("ADDED OVER TIME");

    let stats = calculate_timeline_stats(groups);
    if stats.timeline.is_empty() {
        println!("{}", "No tracks found".yellow());
        return;
    }

    let scale = stats.y_axis_max.max(1.0);
    for month in &stats.timeline {
        let width = ((month.count as f64 / scale) * 40.0).round().min(40.0) as usize;
        println!("{:>9} {:>5} {}", month.label, month.count, "#".repeat(width).cyan());
    }

    let summary = &stats.summary;
    println!();
    println!(
        "From {} to {} ({} months)",
        summary.oldest_date.as_deref().unwrap_or("-"),
        summary.newest_date.as_deref().unwrap_or("-"),
        summary.total_months
    );
    println!("Average songs per month: {}", summary.avg_per_month);
    if let Some(peak) = &summary.peak_month {
        println!("Peak month: {} ({} tracks)", peak.green(), summary.peak_count);
    }
}

fn show_genres(config: &Config, snapshot: &LibrarySnapshot, groups: &[TrackGroup]) {
    header("GENRES");

    let data = calculate_genre_data(groups, &snapshot.artist_lookup(), config.top_n);
    if data.genre_stats.is_empty() {
        println!(
            "{}",
            "No genre data - add artists with genres to the snapshot".yellow()
        );
        return;
    }

    for (i, genre) in data.top_genres.iter().enumerate() {
        println!(
            "{:2}. {} - {} songs ({:.1}%), {} artists",
            i + 1,
            genre.genre.green(),
            genre.track_count,
            genre.percentage,
            genre.artist_count
        );
    }

    println!();
    println!("Total genres: {}", data.overview.total_genres);
    println!(
        "Average genres per song: {:.1}",
        data.overview.avg_genres_per_track
    );

    println!("\nBy quarter:");
    for point in &data.quarterly {
        let shares: Vec<String> = point
            .genres
            .iter()
            .filter(|share| share.actual > 0)
            .map(|share| format!("{} {:.0}%", share.genre, share.percentage))
            .collect();
        println!("  {:>7}  {}", point.quarter, shares.join(", "));
    }
}
