//! Configuration types for kg-walker
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//! - Walk generation mode parsing

use crate::error::ConfigError;
use crate::output::DEFAULT_ROTATION_LINES;
use crate::walks::{WalkOptions, MIN_TEXT_WALK_LENGTH, RDF_TYPE};
use clap::Parser;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Maximum reasonable worker count
const MAX_THREADS: usize = 512;

/// Prefix accepted in front of every mode name
const EXPERIMENTAL_PREFIX: &str = "experimental_";

/// Random walk corpus generator for RDF knowledge graphs
#[derive(Parser, Debug, Clone)]
#[command(
    name = "kg-walker",
    version,
    about = "Random walk corpus generator for RDF knowledge graphs",
    long_about = "Loads a knowledge graph into an in-memory triple store and samples walks for \
                  every entity in parallel.\n\n\
                  Walks are written as gzip-compressed text files (walk_file_<n>.txt.gz), one \
                  walk per line, rotated after a fixed number of lines.",
    after_help = "EXAMPLES:\n    \
        kg-walker --graph dbpedia.nt --walk-dir ./walks\n    \
        kg-walker --graph ./graph-dir --mode mid_walks --walks 200 --depth 6 -t 32\n    \
        kg-walker --graph wiki.nt --light entities.txt --text-walks\n    \
        kg-walker --graph dbpedia.nt --continue ./old-walks --walk-dir ./walks"
)]
pub struct CliArgs {
    /// Triple file (.nt, .ttl, .txt, optionally .gz) or directory of such files
    #[arg(short = 'g', long, value_name = "PATH")]
    pub graph: PathBuf,

    /// Directory receiving the walk files
    #[arg(short = 'o', long, default_value = "./walks", value_name = "DIR")]
    pub walk_dir: PathBuf,

    /// Walk generation mode
    #[arg(
        short = 'm',
        long,
        default_value = "random_walks_duplicate_free",
        value_name = "MODE"
    )]
    pub mode: String,

    /// Number of worker threads
    #[arg(
        short = 't',
        long,
        default_value_t = default_threads(),
        value_name = "NUM"
    )]
    pub threads: usize,

    /// Walks to generate per entity
    #[arg(short = 'n', long, default_value = "100", value_name = "NUM")]
    pub walks: usize,

    /// Hops per walk
    #[arg(short = 'd', long, default_value = "4", value_name = "NUM")]
    pub depth: usize,

    /// Also generate walks over datatype literals
    #[arg(long)]
    pub text_walks: bool,

    /// Maximum tokens per text walk (must be greater than 2)
    #[arg(long, default_value = "6", value_name = "NUM")]
    pub text_walk_length: usize,

    /// Only generate walks for the entities listed in this file (one URI per line)
    #[arg(long, value_name = "FILE")]
    pub light: Option<PathBuf>,

    /// Continue an interrupted run whose walks are in this directory
    #[arg(long = "continue", value_name = "DIR")]
    pub continue_from: Option<PathBuf>,

    /// Predicate identifying entity types for mid-type walks (can be repeated)
    #[arg(long = "type-predicate", value_name = "URI", action = clap::ArgAction::Append)]
    pub type_predicates: Vec<String>,

    /// Emit all blank nodes as a single token in forward walks
    #[arg(long)]
    pub unify_anonymous: bool,

    /// Walk lines per output file before rotating
    #[arg(long, default_value_t = DEFAULT_ROTATION_LINES, value_name = "NUM")]
    pub rotation_lines: usize,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

fn default_threads() -> usize {
    num_cpus::get()
}

/// The available walk generation modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalkGenerationMode {
    /// Bidirectional walks, fair coin per hop
    MidWalks,

    /// Mid walks collapsed into a set
    MidWalksDuplicateFree,

    /// Bidirectional walks weighted by candidate counts, duplicates kept
    MidWalksWeighted,

    /// Forward walks, duplicates allowed
    RandomWalks,

    /// Forward walks by fan-out and random trimming
    RandomWalksDuplicateFree,

    /// Mid walks with entities replaced by their types except the origin
    MidTypeWalksDuplicateFree,

    /// Mid walks reduced to edges plus the origin
    MidEdgeWalksDuplicateFree,

    /// Forward walks reduced to entities
    NodeWalksDuplicateFree,
}

impl WalkGenerationMode {
    /// All modes in declaration order
    pub const ALL: [WalkGenerationMode; 8] = [
        WalkGenerationMode::MidWalks,
        WalkGenerationMode::MidWalksDuplicateFree,
        WalkGenerationMode::MidWalksWeighted,
        WalkGenerationMode::RandomWalks,
        WalkGenerationMode::RandomWalksDuplicateFree,
        WalkGenerationMode::MidTypeWalksDuplicateFree,
        WalkGenerationMode::MidEdgeWalksDuplicateFree,
        WalkGenerationMode::NodeWalksDuplicateFree,
    ];

    /// Canonical lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            WalkGenerationMode::MidWalks => "mid_walks",
            WalkGenerationMode::MidWalksDuplicateFree => "mid_walks_duplicate_free",
            WalkGenerationMode::MidWalksWeighted => "mid_walks_weighted",
            WalkGenerationMode::RandomWalks => "random_walks",
            WalkGenerationMode::RandomWalksDuplicateFree => "random_walks_duplicate_free",
            WalkGenerationMode::MidTypeWalksDuplicateFree => "mid_type_walks_duplicate_free",
            WalkGenerationMode::MidEdgeWalksDuplicateFree => "mid_edge_walks_duplicate_free",
            WalkGenerationMode::NodeWalksDuplicateFree => "node_walks_duplicate_free",
        }
    }

    /// All mode names separated by ` | `
    pub fn options() -> String {
        Self::ALL
            .iter()
            .map(|m| m.name())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// True for modes whose walks need not start with the origin entity
    pub fn is_mid_family(&self) -> bool {
        matches!(
            self,
            WalkGenerationMode::MidWalks
                | WalkGenerationMode::MidWalksDuplicateFree
                | WalkGenerationMode::MidWalksWeighted
                | WalkGenerationMode::MidTypeWalksDuplicateFree
                | WalkGenerationMode::MidEdgeWalksDuplicateFree
        )
    }
}

impl fmt::Display for WalkGenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WalkGenerationMode {
    type Err = ConfigError;

    /// Case-insensitive; an `experimental_` prefix is accepted for every mode
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let name = normalized
            .strip_prefix(EXPERIMENTAL_PREFIX)
            .unwrap_or(&normalized);

        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name() == name)
            .ok_or_else(|| ConfigError::UnknownMode {
                name: s.to_string(),
                options: Self::options(),
            })
    }
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Triple file or directory
    pub graph_path: PathBuf,

    /// Output directory for walk files
    pub walk_dir: PathBuf,

    /// Walk generation mode
    pub mode: WalkGenerationMode,

    /// Number of worker threads
    pub thread_count: usize,

    /// Walks per entity
    pub walks_per_entity: usize,

    /// Hops per walk
    pub depth: usize,

    /// Generate text walks after the graph walks
    pub text_walks: bool,

    /// Token budget per text walk
    pub text_walk_length: usize,

    /// Entity allow-list (light mode)
    pub light_entity_file: Option<PathBuf>,

    /// Walk directory of an interrupted run
    pub existing_walk_dir: Option<PathBuf>,

    /// Predicates identifying entity types
    pub type_predicates: Vec<String>,

    /// Unify blank nodes in forward walks
    pub unify_anonymous: bool,

    /// Walk lines per output file
    pub rotation_lines: usize,

    /// Show progress indicator
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl GenerationConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let mode: WalkGenerationMode = args.mode.parse()?;

        // Validate thread count
        if args.threads == 0 || args.threads > MAX_THREADS {
            return Err(ConfigError::InvalidThreadCount {
                count: args.threads,
                max: MAX_THREADS,
            });
        }

        if args.walks == 0 {
            return Err(ConfigError::InvalidWalkCount { count: args.walks });
        }

        if args.depth == 0 {
            return Err(ConfigError::InvalidDepth { depth: args.depth });
        }

        if args.text_walk_length < MIN_TEXT_WALK_LENGTH {
            return Err(ConfigError::InvalidTextWalkLength {
                length: args.text_walk_length,
            });
        }

        if args.rotation_lines == 0 {
            return Err(ConfigError::InvalidRotation {
                lines: args.rotation_lines,
            });
        }

        // Validate input paths
        if !args.graph.exists() {
            return Err(ConfigError::InvalidInputPath {
                path: args.graph.clone(),
                reason: "Graph file or directory does not exist".to_string(),
            });
        }

        if let Some(ref light) = args.light {
            if !light.is_file() {
                return Err(ConfigError::InvalidInputPath {
                    path: light.clone(),
                    reason: "Entity file does not exist".to_string(),
                });
            }
        }

        if args.walk_dir.is_file() {
            return Err(ConfigError::InvalidOutputPath {
                path: args.walk_dir.clone(),
                reason: "Walk directory is an existing file".to_string(),
            });
        }

        let type_predicates = if args.type_predicates.is_empty() {
            vec![RDF_TYPE.to_string()]
        } else {
            args.type_predicates
        };

        Ok(Self {
            graph_path: args.graph,
            walk_dir: args.walk_dir,
            mode,
            thread_count: args.threads,
            walks_per_entity: args.walks,
            depth: args.depth,
            text_walks: args.text_walks,
            text_walk_length: args.text_walk_length,
            light_entity_file: args.light,
            existing_walk_dir: args.continue_from,
            type_predicates,
            unify_anonymous: args.unify_anonymous,
            rotation_lines: args.rotation_lines,
            show_progress: !args.quiet,
            verbose: args.verbose,
        })
    }

    /// Create a configuration with defaults for programmatic use
    pub fn new(graph_path: impl Into<PathBuf>, walk_dir: impl Into<PathBuf>, mode: WalkGenerationMode) -> Self {
        Self {
            graph_path: graph_path.into(),
            walk_dir: walk_dir.into(),
            mode,
            thread_count: default_threads().min(MAX_THREADS),
            walks_per_entity: 100,
            depth: 4,
            text_walks: false,
            text_walk_length: 6,
            light_entity_file: None,
            existing_walk_dir: None,
            type_predicates: vec![RDF_TYPE.to_string()],
            unify_anonymous: false,
            rotation_lines: DEFAULT_ROTATION_LINES,
            show_progress: false,
            verbose: false,
        }
    }

    /// Parameters handed to the walk algorithms
    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            walks_per_entity: self.walks_per_entity,
            depth: self.depth,
            unify_anonymous: self.unify_anonymous,
            type_predicates: self.type_predicates.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn args_for(graph: &std::path::Path) -> CliArgs {
        CliArgs::parse_from(["kg-walker", "--graph", graph.to_str().unwrap()])
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(
            "mid_walks".parse::<WalkGenerationMode>().unwrap(),
            WalkGenerationMode::MidWalks
        );
        assert_eq!(
            "  RANDOM_WALKS_DUPLICATE_FREE ".parse::<WalkGenerationMode>().unwrap(),
            WalkGenerationMode::RandomWalksDuplicateFree
        );
        assert_eq!(
            "experimental_mid_edge_walks_duplicate_free"
                .parse::<WalkGenerationMode>()
                .unwrap(),
            WalkGenerationMode::MidEdgeWalksDuplicateFree
        );
        assert_eq!(
            "node_walks_duplicate_free".parse::<WalkGenerationMode>().unwrap(),
            WalkGenerationMode::NodeWalksDuplicateFree
        );
        assert!(matches!(
            "sideways_walks".parse::<WalkGenerationMode>(),
            Err(ConfigError::UnknownMode { .. })
        ));
    }

    #[test]
    fn test_mode_names_round_trip() {
        for mode in WalkGenerationMode::ALL {
            assert_eq!(mode.to_string().parse::<WalkGenerationMode>().unwrap(), mode);
        }
        assert_eq!(WalkGenerationMode::options().matches(" | ").count(), 7);
    }

    #[test]
    fn test_mid_family() {
        assert!(WalkGenerationMode::MidWalksWeighted.is_mid_family());
        assert!(WalkGenerationMode::MidTypeWalksDuplicateFree.is_mid_family());
        assert!(!WalkGenerationMode::RandomWalks.is_mid_family());
        assert!(!WalkGenerationMode::NodeWalksDuplicateFree.is_mid_family());
    }

    #[test]
    fn test_defaults_from_args() {
        let graph = NamedTempFile::new().unwrap();
        let config = GenerationConfig::from_args(args_for(graph.path())).unwrap();
        assert_eq!(config.mode, WalkGenerationMode::RandomWalksDuplicateFree);
        assert_eq!(config.walks_per_entity, 100);
        assert_eq!(config.depth, 4);
        assert_eq!(config.text_walk_length, 6);
        assert_eq!(config.rotation_lines, DEFAULT_ROTATION_LINES);
        assert_eq!(config.type_predicates, vec![RDF_TYPE.to_string()]);
        assert!(config.show_progress);
        assert!(config.thread_count >= 1);
    }

    #[test]
    fn test_validation_errors() {
        let graph = NamedTempFile::new().unwrap();

        let mut args = args_for(graph.path());
        args.threads = 0;
        assert!(matches!(
            GenerationConfig::from_args(args),
            Err(ConfigError::InvalidThreadCount { .. })
        ));

        let mut args = args_for(graph.path());
        args.threads = MAX_THREADS + 1;
        assert!(GenerationConfig::from_args(args).is_err());

        let mut args = args_for(graph.path());
        args.depth = 0;
        assert!(matches!(
            GenerationConfig::from_args(args),
            Err(ConfigError::InvalidDepth { .. })
        ));

        let mut args = args_for(graph.path());
        args.walks = 0;
        assert!(matches!(
            GenerationConfig::from_args(args),
            Err(ConfigError::InvalidWalkCount { .. })
        ));

        let mut args = args_for(graph.path());
        args.text_walk_length = 2;
        assert!(matches!(
            GenerationConfig::from_args(args),
            Err(ConfigError::InvalidTextWalkLength { .. })
        ));

        let mut args = args_for(graph.path());
        args.rotation_lines = 0;
        assert!(matches!(
            GenerationConfig::from_args(args),
            Err(ConfigError::InvalidRotation { .. })
        ));

        let mut args = args_for(graph.path());
        args.mode = "bogus".into();
        assert!(matches!(
            GenerationConfig::from_args(args),
            Err(ConfigError::UnknownMode { .. })
        ));
    }

    #[test]
    fn test_missing_paths() {
        let args = CliArgs::parse_from(["kg-walker", "--graph", "/nonexistent/graph.nt"]);
        assert!(matches!(
            GenerationConfig::from_args(args),
            Err(ConfigError::InvalidInputPath { .. })
        ));

        let graph = NamedTempFile::new().unwrap();
        let mut args = args_for(graph.path());
        args.light = Some(PathBuf::from("/nonexistent/entities.txt"));
        assert!(matches!(
            GenerationConfig::from_args(args),
            Err(ConfigError::InvalidInputPath { .. })
        ));
    }

    #[test]
    fn test_repeated_type_predicates() {
        let graph = NamedTempFile::new().unwrap();
        let args = CliArgs::parse_from([
            "kg-walker",
            "--graph",
            graph.path().to_str().unwrap(),
            "--type-predicate",
            "http://a/type",
            "--type-predicate",
            "http://b/kind",
        ]);
        let config = GenerationConfig::from_args(args).unwrap();
        assert_eq!(config.type_predicates, vec!["http://a/type", "http://b/kind"]);
    }
}
