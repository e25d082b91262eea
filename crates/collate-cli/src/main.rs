//! Collate CLI
//!
//! Command-line tool that collates commodities, modules and ships seen in
//! station snapshots into `commodity.csv`, `outfitting.csv` and `shipyard.csv`.

use clap::{ArgAction, CommandFactory, Parser};
use collate_core::{
    discover_snapshots, Catalog, Collator, FileStore, MappingOverrides, NameMaps, Outfitting,
};
use std::path::PathBuf;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "collate")]
#[command(about = "Collate seen commodities, modules and ships from station snapshots", long_about = None)]
#[command(version)]
struct Cli {
    /// Snapshot files, or directories to search for *.json snapshots
    files: Vec<PathBuf>,

    /// Directory holding the reference tables
    #[arg(short = 'C', long, env = "COLLATE_DIR", default_value = ".")]
    dir: PathBuf,

    /// JSON file with extra commodity, category and ship name mappings
    #[arg(short, long, env = "COLLATE_MAPPINGS")]
    mappings: Option<PathBuf>,

    /// Carry on with later snapshots after an integrity fault
    #[arg(long)]
    keep_going: bool,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, rust_log.as_deref()))
        .with_target(false)
        .init();
}

/// `RUST_LOG` directives win when set and valid; otherwise `-v` picks the level
fn log_filter(verbose: u8, rust_log: Option<&str>) -> EnvFilter {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::default().add_directive(level.into()))
}

/// Returns whether every snapshot was collated cleanly
fn run(cli: &Cli) -> collate_core::Result<bool> {
    if cli.files.is_empty() {
        println!("{}", Cli::command().render_usage());
        return Ok(true);
    }

    let mut names = NameMaps::builtin();
    if let Some(path) = &cli.mappings {
        names = names.with_overrides(MappingOverrides::load(path)?);
        let (commodities, categories, ships) = names.sizes();
        debug!(
            "Loaded mappings from {}: {} commodities, {} categories, {} ships",
            path.display(),
            commodities,
            categories,
            ships
        );
    }

    let files = discover_snapshots(&cli.files)?;
    if files.is_empty() {
        warn!("No snapshots found");
        return Ok(true);
    }

    let store = FileStore::new(&cli.dir);
    debug!("Reference tables in {}", store.dir().display());
    let mut collator = Collator::new(store, Catalog::new(names, Outfitting));

    let mut added = 0;
    let mut failed = 0;

    for path in &files {
        info!("{}", path.display());

        match collator.collate_file(path) {
            Ok(report) => {
                added += report.total_added();
                if report.has_failures() {
                    failed += 1;
                }
            }
            Err(e) if e.is_integrity() => {
                error!("{}: {}", path.display(), e);
                failed += 1;
                if !cli.keep_going {
                    error!("Halting: mapping tables disagree with stored data");
                    return Ok(false);
                }
            }
            Err(e) => {
                error!("{}: {}", path.display(), e);
                failed += 1;
            }
        }
    }

    info!(
        "Processed {} snapshot(s): {} new record(s), {} failed",
        files.len(),
        added,
        failed
    );

    Ok(failed == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::{Layer, Registry};

    fn max_level(filter: &EnvFilter) -> Option<LevelFilter> {
        Layer::<Registry>::max_level_hint(filter)
    }

    fn market(commodities: &str) -> String {
        format!(
            r#"{{"commander": {{"docked": true}}, "lastStarport": {{"name": "X", "commodities": [{}]}}}}"#,
            commodities
        )
    }

    const GOLD_100: &str = r#"{"id": 1, "name": "Gold", "categoryname": "Metals", "cost_mean": "100"}"#;
    const GOLD_200: &str = r#"{"id": 1, "name": "Gold", "categoryname": "Metals", "cost_mean": "200"}"#;
    const TEA: &str = r#"{"id": 2, "name": "Tea", "categoryname": "Foods", "cost_mean": "50"}"#;

    /// Writes the snapshots into `dir` and runs over them in order
    fn run_batch(dir: &Path, snapshots: &[(&str, String)], keep_going: bool) -> bool {
        let mut args = vec!["collate".to_string(), "-C".to_string(), dir.display().to_string()];
        if keep_going {
            args.push("--keep-going".to_string());
        }
        for (name, content) in snapshots {
            let path = dir.join(name);
            fs::write(&path, content).unwrap();
            args.push(path.display().to_string());
        }
        run(&Cli::try_parse_from(args).unwrap()).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from(["collate", "-C", "tables", "--keep-going", "-vv", "a.json", "b.json"])
            .unwrap();
        assert_eq!(cli.files, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
        assert_eq!(cli.dir, PathBuf::from("tables"));
        assert!(cli.keep_going);
        assert_eq!(cli.verbose, 2);
        assert!(cli.mappings.is_none());
    }

    #[test]
    fn test_no_files_is_not_an_error() {
        let cli = Cli::try_parse_from(["collate", "-C", "unused"]).unwrap();
        assert!(cli.files.is_empty());
        assert!(run(&cli).unwrap());
    }

    #[test]
    fn test_rust_log_overrides_verbosity() {
        assert_eq!(max_level(&log_filter(2, Some("warn"))), Some(LevelFilter::WARN));
        assert_eq!(max_level(&log_filter(0, Some("error"))), Some(LevelFilter::ERROR));
    }

    #[test]
    fn test_verbosity_without_rust_log() {
        assert_eq!(max_level(&log_filter(0, None)), Some(LevelFilter::INFO));
        assert_eq!(max_level(&log_filter(1, None)), Some(LevelFilter::DEBUG));
        assert_eq!(max_level(&log_filter(3, Some(""))), Some(LevelFilter::TRACE));
        assert_eq!(max_level(&log_filter(1, Some("gold=lots"))), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_integrity_fault_halts_batch() {
        let dir = tempfile::tempdir().unwrap();
        let ok = run_batch(
            dir.path(),
            &[("a.json", market(GOLD_100)), ("b.json", market(GOLD_200)), ("c.json", market(TEA))],
            false,
        );

        assert!(!ok);
        assert_eq!(
            fs::read_to_string(dir.path().join("commodity.csv")).unwrap(),
            "id,category,name,average\n1,Metals,Gold,100\n"
        );
    }

    #[test]
    fn test_keep_going_continues_past_integrity_fault() {
        let dir = tempfile::tempdir().unwrap();
        let ok = run_batch(
            dir.path(),
            &[("a.json", market(GOLD_100)), ("b.json", market(GOLD_200)), ("c.json", market(TEA))],
            true,
        );

        assert!(!ok);
        assert_eq!(
            fs::read_to_string(dir.path().join("commodity.csv")).unwrap(),
            "id,category,name,average\n2,Foods,Tea,50\n1,Metals,Gold,100\n"
        );
    }

    #[test]
    fn test_parse_fault_continues_batch() {
        let dir = tempfile::tempdir().unwrap();
        let ok = run_batch(
            dir.path(),
            &[("a.json", "{not json".to_string()), ("b.json", market(TEA))],
            false,
        );

        assert!(!ok);
        assert_eq!(
            fs::read_to_string(dir.path().join("commodity.csv")).unwrap(),
            "id,category,name,average\n2,Foods,Tea,50\n"
        );
    }

    #[test]
    fn test_clean_batch_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let ok = run_batch(
            dir.path(),
            &[("a.json", market(GOLD_100)), ("b.json", market(&format!("{}, {}", GOLD_100, TEA)))],
            false,
        );

        assert!(ok);
        assert!(dir.path().join("commodity.csv.bak").exists());
    }
}
