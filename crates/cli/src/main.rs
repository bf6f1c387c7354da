use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use memos_core::logging::{self, LoggingConfig};
use memos_core::{Config, Memo, RenderConfig, Shortcut, TodoIdMode, UserId, Visibility};
use memos_filter::{DateRange, FeedStatus, FilterSpec, MemoFeed, MemoType, StaticSource};
use memos_render::{MarkdownRenderer, Rendered};
use owo_colors::OwoColorize;
use std::io::Read;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "memos.toml";

/// memos - render and filter memo content
#[derive(Parser, Debug)]
#[command(name = "memos")]
#[command(about = "Render memo markdown to safe HTML and evaluate memo list filters", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to memos.toml (default: ./memos.toml, defaults used when missing)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render markdown to sanitized HTML
    Render {
        /// Markdown file (default: stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Derive checkbox ids from the content instead of generating them
        #[arg(long)]
        stable_ids: bool,
    },
    /// Filter and order a memo list
    Filter(FilterArgs),
    /// Write an example memos.toml
    InitConfig {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(clap::Args, Debug)]
struct FilterArgs {
    /// JSON file holding an array of memos
    #[arg(long, value_name = "FILE")]
    memos: PathBuf,

    /// User whose list is shown
    #[arg(long, value_name = "ID")]
    user: UserId,

    /// Tag, or parent tag, to match
    #[arg(long)]
    tag: Option<String>,

    /// Start of the display-time window (Unix ms, inclusive)
    #[arg(long, value_name = "MS", requires = "to")]
    from: Option<i64>,

    /// End of the display-time window (Unix ms, inclusive)
    #[arg(long, value_name = "MS", requires = "from")]
    to: Option<i64>,

    /// not-tagged or linked
    #[arg(long = "type", value_name = "TYPE")]
    memo_type: Option<MemoType>,

    /// Case-insensitive substring
    #[arg(long)]
    text: Option<String>,

    /// PUBLIC, PROTECTED or PRIVATE
    #[arg(long)]
    visibility: Option<Visibility>,

    /// Shortcut payload: a JSON array of filters
    #[arg(long, value_name = "PAYLOAD")]
    shortcut: Option<String>,

    /// Fetch every page instead of stopping once a page is visible
    #[arg(long)]
    all: bool,
}

impl FilterArgs {
    fn to_spec(&self) -> FilterSpec {
        FilterSpec {
            tag: self.tag.clone(),
            duration: self.from.zip(self.to).map(|(from, to)| DateRange::new(from, to)),
            memo_type: self.memo_type,
            text: self.text.clone(),
            shortcut: self.shortcut.as_ref().map(|payload| Shortcut::new(0, "command line", payload.clone())),
            visibility: self.visibility,
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    match cli.command {
        Commands::InitConfig { force } => cmd_init_config(&config_path, force),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "memos", &mut std::io::stdout());
            Ok(())
        }
        Commands::Render { file, stable_ids } => {
            let config = load_config(&config_path, cli.verbose)?;
            let _guard = logging::init_logging(Some(logging_config(&config, cli.verbose)))
                .context("Failed to initialize logging")?;
            cmd_render(&config, file.as_deref(), stable_ids, cli.verbose)
        }
        Commands::Filter(args) => {
            let config = load_config(&config_path, cli.verbose)?;
            let _guard = logging::init_logging(Some(logging_config(&config, cli.verbose)))
                .context("Failed to initialize logging")?;
            cmd_filter(&config, &args, cli.verbose)
        }
    }
}

/// Load config from file, falling back to defaults when it does not exist
fn load_config(path: &Path, verbose: bool) -> Result<Config> {
    if verbose {
        if path.exists() {
            eprintln!("{} Using config: {}", "Info:".blue().bold(), path.display());
        } else {
            eprintln!("{} No config at {}, using defaults", "Info:".blue().bold(), path.display());
        }
    }

    Config::load_or_default(path).with_context(|| format!("Failed to load config from {}", path.display()))
}

fn logging_config(config: &Config, verbose: bool) -> LoggingConfig {
    let logging_config = LoggingConfig::from(config.logging.clone());
    if verbose { logging_config.with_level("debug") } else { logging_config }
}

/// Write the example configuration
fn cmd_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    std::fs::write(path, Config::example()).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} Created config at {}", "Success:".green().bold(), path.display());
    Ok(())
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input).context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

fn render_content(config: &RenderConfig, markdown: &str, stable_ids: bool) -> Rendered {
    let mut render_config = config.clone();
    if stable_ids {
        render_config.todo_ids = TodoIdMode::Stable;
    }
    MarkdownRenderer::new(render_config).render(markdown)
}

/// Render markdown from a file or stdin to stdout
fn cmd_render(config: &Config, file: Option<&Path>, stable_ids: bool, verbose: bool) -> Result<()> {
    let markdown = read_input(file)?;
    let rendered = render_content(&config.render, &markdown, stable_ids);

    if verbose {
        eprintln!("{} Task items: {}", "Info:".blue().bold(), rendered.task_count.to_string().cyan());
        eprintln!("{} Diagram blocks: {}", "Info:".blue().bold(), rendered.diagrams.len().to_string().cyan());
    }

    println!("{}", rendered.html);
    Ok(())
}

fn load_memos(path: &Path) -> Result<Vec<Memo>> {
    let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("{} is not a JSON array of memos", path.display()))
}

/// Page `memos` through a feed and return the visible list
async fn collect_view(
    memos: Vec<Memo>, config: &Config, spec: &FilterSpec, user: UserId, all: bool,
) -> Result<(Vec<Memo>, FeedStatus)> {
    let mut feed = MemoFeed::from_config(StaticSource::new(memos), &config.feed);

    if all {
        while !feed.is_complete() {
            if feed.fetch_more().await? == 0 && !feed.is_complete() {
                break;
            }
        }
    } else {
        feed.fill(spec, user).await?;
    }

    let shown: Vec<Memo> = feed.view(spec, user).into_iter().cloned().collect();
    let status = feed.status(shown.len());
    tracing::info!(loaded = feed.len(), shown = shown.len(), "memo list ready");

    Ok((shown, status))
}

/// Print the filtered, ordered memo list as JSON
fn cmd_filter(config: &Config, args: &FilterArgs, verbose: bool) -> Result<()> {
    let memos = load_memos(&args.memos)?;
    let spec = args.to_spec();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;
    let (shown, status) = runtime.block_on(collect_view(memos, config, &spec, args.user, args.all))?;

    if verbose {
        eprintln!("{} Showing {} memos", "Info:".blue().bold(), shown.len().to_string().cyan());
        match status {
            FeedStatus::MoreAvailable => eprintln!("{} More memos available", "Info:".blue().bold()),
            FeedStatus::Complete { empty: true } => eprintln!("{} No memos match", "Info:".yellow().bold()),
            FeedStatus::Complete { empty: false } => eprintln!("{} All memos loaded", "Info:".blue().bold()),
        }
    }

    println!("{}", serde_json::to_string_pretty(&shown)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MEMOS_JSON: &str = r##"[
        {"id": 1, "creatorId": 1, "content": "#work notes", "displayTs": 100},
        {"id": 2, "creatorId": 1, "content": "groceries", "displayTs": 200, "pinned": true},
        {"id": 3, "creatorId": 2, "content": "#work theirs", "displayTs": 300}
    ]"##;

    fn memos() -> Vec<Memo> {
        serde_json::from_str(MEMOS_JSON).unwrap()
    }

    fn filter_args(args: &[&str]) -> FilterArgs {
        let argv = ["memos", "filter", "--memos", "memos.json", "--user", "1"].iter().chain(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Filter(args) => args,
            other => panic!("Expected Filter command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["memos", "render"]).unwrap();
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Render { file: None, stable_ids: false }));
    }

    #[test]
    fn test_cli_with_config_and_verbose() {
        let cli = Cli::try_parse_from(["memos", "--config", "/etc/memos.toml", "-v", "render", "note.md"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/memos.toml")));
        assert!(cli.verbose);
        if let Commands::Render { file, .. } = cli.command {
            assert_eq!(file, Some(PathBuf::from("note.md")));
        } else {
            panic!("Expected Render command");
        }
    }

    #[test]
    fn test_cli_filter_args() {
        let args = filter_args(&["--tag", "work", "--type", "not-tagged", "--visibility", "public", "--text", "x"]);
        assert_eq!(args.user, 1);
        assert_eq!(args.tag.as_deref(), Some("work"));
        assert_eq!(args.memo_type, Some(MemoType::NotTagged));
        assert_eq!(args.visibility, Some(Visibility::Public));
        assert!(!args.all);
    }

    #[test]
    fn test_cli_duration_needs_both_bounds() {
        let result = Cli::try_parse_from(["memos", "filter", "--memos", "m.json", "--user", "1", "--from", "5"]);
        assert!(result.is_err());

        let args = filter_args(&["--from", "5", "--to", "10"]);
        assert_eq!(args.to_spec().duration, Some(DateRange::new(5, 10)));
    }

    #[test]
    fn test_cli_rejects_unknown_type() {
        let result = Cli::try_parse_from(["memos", "filter", "--memos", "m.json", "--user", "1", "--type", "imaged"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_to_spec_with_shortcut() {
        let spec = filter_args(&["--shortcut", "[]"]).to_spec();
        assert_eq!(spec.shortcut.map(|s| s.payload), Some("[]".to_string()));
        assert!(spec.tag.is_none());
        assert!(spec.duration.is_none());
    }

    #[test]
    fn test_render_content_stable_ids() {
        let config = RenderConfig::default();
        let first = render_content(&config, "- [ ] one", true);
        let second = render_content(&config, "- [ ] one", true);
        assert_eq!(first.html, second.html);
        assert_eq!(first.task_count, 1);
    }

    #[test]
    fn test_read_input_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("note.md");
        std::fs::write(&path, "#hello").unwrap();

        assert_eq!(read_input(Some(&path)).unwrap(), "#hello");
        assert!(read_input(Some(&temp.path().join("missing.md"))).is_err());
    }

    #[test]
    fn test_load_memos() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("memos.json");
        std::fs::write(&path, MEMOS_JSON).unwrap();
        assert_eq!(load_memos(&path).unwrap().len(), 3);

        std::fs::write(&path, "{}").unwrap();
        let err = load_memos(&path).unwrap_err();
        assert!(err.to_string().contains("not a JSON array of memos"));
    }

    #[test]
    fn test_collect_view() {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let config = Config::default();

        let spec = FilterSpec::new();
        let (shown, status) = runtime.block_on(collect_view(memos(), &config, &spec, 1, false)).unwrap();
        assert_eq!(shown.iter().map(|m| m.id).collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(status, FeedStatus::Complete { empty: false });

        let spec = FilterSpec::new().with_tag("home");
        let (shown, status) = runtime.block_on(collect_view(memos(), &config, &spec, 1, true)).unwrap();
        assert!(shown.is_empty());
        assert_eq!(status, FeedStatus::Complete { empty: true });
    }

    #[test]
    fn test_init_config_writes_example() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("memos.toml");

        cmd_init_config(&path, false).unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config, Config::default());

        assert!(cmd_init_config(&path, false).is_err());
        assert!(cmd_init_config(&path, true).is_ok());
    }

    #[test]
    fn test_load_config_missing_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(&temp.path().join("absent.toml"), true).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_invalid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("memos.toml");
        std::fs::write(&path, "[feed]\npage_size = 0\n").unwrap();
        assert!(load_config(&path, false).is_err());
    }

    #[test]
    fn test_logging_config_verbose() {
        let config = Config::default();
        assert_eq!(logging_config(&config, false).level, "warn");
        assert_eq!(logging_config(&config, true).level, "debug");
    }
}
