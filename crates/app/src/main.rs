mod console;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quiz_core::model::{
    ClientSettings, Difficulty, QuestionDraft, QuestionSet, QuizConfig, ShareSlug, SourceDocument,
};
use quiz_core::{Action, Navigator, Outcome, Stage};
use services::config::settings_draft_from_env;
use services::export::{render_table, table_rows, write_csv_file};
use services::{Applied, HttpLeaderboardClient, HttpQuizGenerator, QuizFlow};

use console::Command;

const DEFAULT_LOG_FILTER: &str = "quiz=info,services=info";
const SHARE_SLUG_VAR: &str = "QUIZ_SHARE_SLUG";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidValue { flag: &'static str, raw: String },
    InvalidSlug { raw: String },
    MissingSource,
    ConflictingSources,
    MissingName,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidValue { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidSlug { raw } => write!(f, "invalid --slug value: {raw}"),
            ArgsError::MissingSource => write!(f, "either --document or --quiz is required"),
            ArgsError::ConflictingSources => write!(f, "--document and --quiz are exclusive"),
            ArgsError::MissingName => write!(f, "--name is required for a shared quiz"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz --document <file.pdf> [--questions N] [--difficulty easy|medium|hard]");
    eprintln!("  quiz --quiz <file.json> --slug <slug> --name <participant>");
    eprintln!();
    eprintln!("Options:");
    eprintln!(
        "  --base-url <url>      quiz server (default {})",
        ClientSettings::DEFAULT_BASE_URL
    );
    eprintln!("  --export-csv <path>   write the questions as CSV once the quiz is finished");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_API_BASE_URL, QUIZ_API_TIMEOUT_SECS, QUIZ_SHARE_SLUG, RUST_LOG");
}

/// Where the questions come from.
#[derive(Debug)]
enum Source {
    Document(PathBuf),
    SharedFile {
        path: PathBuf,
        slug: ShareSlug,
        name: String,
    },
}

#[derive(Debug)]
struct Args {
    source: Source,
    base_url: Option<String>,
    questions: Option<u32>,
    difficulty: Option<Difficulty>,
    export_csv: Option<PathBuf>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut document = None;
        let mut quiz_file = None;
        let mut slug = std::env::var(SHARE_SLUG_VAR).ok();
        let mut name = None;
        let mut base_url = None;
        let mut questions = None;
        let mut difficulty = None;
        let mut export_csv = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--document" => {
                    document = Some(PathBuf::from(require_value(args, "--document")?));
                }
                "--quiz" => quiz_file = Some(PathBuf::from(require_value(args, "--quiz")?)),
                "--slug" => slug = Some(require_value(args, "--slug")?),
                "--name" => name = Some(require_value(args, "--name")?),
                "--base-url" => base_url = Some(require_value(args, "--base-url")?),
                "--questions" => {
                    let value = require_value(args, "--questions")?;
                    let parsed = value.trim().parse().map_err(|_| ArgsError::InvalidValue {
                        flag: "--questions",
                        raw: value.clone(),
                    })?;
                    questions = Some(parsed);
                }
                "--difficulty" => {
                    let value = require_value(args, "--difficulty")?;
                    let parsed = value.parse().map_err(|_| ArgsError::InvalidValue {
                        flag: "--difficulty",
                        raw: value.clone(),
                    })?;
                    difficulty = Some(parsed);
                }
                "--export-csv" => {
                    export_csv = Some(PathBuf::from(require_value(args, "--export-csv")?));
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let source = match (document, quiz_file) {
            (Some(_), Some(_)) => return Err(ArgsError::ConflictingSources),
            (None, None) => return Err(ArgsError::MissingSource),
            (Some(path), None) => Source::Document(path),
            (None, Some(path)) => {
                let raw = slug.ok_or(ArgsError::MissingValue { flag: "--slug" })?;
                let slug = raw
                    .parse()
                    .map_err(|_| ArgsError::InvalidSlug { raw: raw.clone() })?;
                let name = name
                    .filter(|name| !name.trim().is_empty())
                    .ok_or(ArgsError::MissingName)?;
                Source::SharedFile { path, slug, name }
            }
        };

        Ok(Self {
            source,
            base_url,
            questions,
            difficulty,
            export_csv,
        })
    }
}

type Input = Lines<BufReader<Stdin>>;

/// How a session loop ended.
enum Exit {
    Quit,
    Restart,
}

/// How setting up a quiz ended.
enum Setup {
    Ready,
    /// The session was reset while a request was in flight; start over.
    Again,
    Quit,
}

fn read_question_file(path: &Path) -> Result<QuestionSet, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)?;
    let drafts: Vec<QuestionDraft> = serde_json::from_slice(&bytes)?;
    Ok(QuestionSet::from_drafts(drafts)?)
}

async fn prompt(input: &mut Input, text: &str) -> Result<Option<String>, std::io::Error> {
    println!("{text}");
    input.next_line().await
}

/// Bring the flow from its entry stage into `Quiz`.
///
/// Generation failures that leave the flow in `Configure` are reported and
/// can be retried; anything else ends the program.
async fn set_up(
    flow: &QuizFlow,
    args: &Args,
    input: &mut Input,
) -> Result<Setup, Box<dyn std::error::Error>> {
    match &args.source {
        Source::SharedFile { path, name, .. } => {
            let questions = read_question_file(path)?;
            flow.start_shared(name, questions)?;
            Ok(Setup::Ready)
        }
        Source::Document(path) => {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let document = SourceDocument::new(file_name, std::fs::read(path)?)?;
            let config = QuizConfig::new(
                args.questions.unwrap_or(QuizConfig::DEFAULT_QUESTIONS),
                args.difficulty.unwrap_or_default(),
            )?;
            flow.with_navigator(|nav| {
                nav.select_document(document)?;
                nav.configure(config)
            })?;

            match flow.load_topics().await? {
                Applied::Done(Stage::Topics) => choose_topics(flow, input).await?,
                Applied::Done(_) => {}
                Applied::Stale => return Ok(Setup::Again),
            }

            loop {
                println!("Generating questions...");
                match flow.generate_and_start().await {
                    Ok(Applied::Done(started)) => {
                        println!("{} questions ready.", started.question_count);
                        for tip in &started.recommendations {
                            println!("  tip: {tip}");
                        }
                        return Ok(Setup::Ready);
                    }
                    Ok(Applied::Stale) => {
                        warn!("generation finished after the session was reset");
                        return Ok(Setup::Again);
                    }
                    Err(err) if err.is_retryable() => {
                        eprintln!("{err}");
                        let line = prompt(input, "Press Enter to retry, or q to quit.").await?;
                        if !line.as_deref().is_some_and(console::wants_retry) {
                            return Ok(Setup::Quit);
                        }
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }
    }
}

async fn choose_topics(
    flow: &QuizFlow,
    input: &mut Input,
) -> Result<(), Box<dyn std::error::Error>> {
    let topics = flow.with_navigator(|nav| nav.offered_topics().to_vec());
    for (i, topic) in topics.iter().enumerate() {
        println!("  {}) {topic}", i + 1);
    }
    let Some(line) = prompt(input, "Topic numbers to focus on (blank for all):").await? else {
        return Ok(());
    };
    for raw in line.split([',', ' ']).filter(|raw| !raw.is_empty()) {
        let chosen = raw
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| topics.get(i));
        match chosen {
            Some(topic) => {
                flow.with_navigator(|nav| nav.toggle_topic(topic))?;
            }
            None => eprintln!("ignoring unknown topic: {raw}"),
        }
    }
    Ok(())
}

async fn run_session(
    flow: &QuizFlow,
    args: &Args,
    input: &mut Input,
) -> Result<Exit, Box<dyn std::error::Error>> {
    let shared = matches!(args.source, Source::SharedFile { .. });
    loop {
        let (stage, lines) = flow.with_navigator(|nav| (nav.stage(), console::render(nav)));
        for line in lines {
            println!("{line}");
        }
        let Some(line) = prompt(input, "> ").await? else {
            return Ok(Exit::Quit);
        };
        let Some(command) = console::parse_command(&line, stage) else {
            eprintln!("unknown command; try help");
            continue;
        };

        let action = match command {
            Command::Quit => return Ok(Exit::Quit),
            Command::Help => {
                println!("{}", console::help(stage));
                continue;
            }
            Command::Table => {
                if let Some(set) = flow.with_navigator(|nav| nav.question_set().cloned()) {
                    print!("{}", render_table(&table_rows(&set)));
                }
                continue;
            }
            Command::ExportCsv(path) => {
                export_csv(flow, Path::new(&path));
                continue;
            }
            Command::Choose(number) => {
                match flow.with_navigator(|nav| console::choose(nav, number)) {
                    Some(action) => action,
                    None => {
                        eprintln!("no option {number}");
                        continue;
                    }
                }
            }
            Command::Act(action) => action,
        };

        match flow.dispatch(action) {
            Ok(Outcome::Entered(entered)) if entered == entry_stage(shared) => {
                info!("session restarted");
                return Ok(Exit::Restart);
            }
            Ok(Outcome::Finished(summary)) => {
                info!(score = %summary, "quiz finished");
                if let Some(path) = &args.export_csv {
                    export_csv(flow, path);
                }
                if shared {
                    println!("Submitting score...");
                    flow.publish_result().await?;
                }
            }
            Ok(_) => {}
            Err(err) => eprintln!("{err}"),
        }
    }
}

fn entry_stage(shared: bool) -> Stage {
    if shared { Stage::Configure } else { Stage::Upload }
}

fn export_csv(flow: &QuizFlow, path: &Path) {
    let Some(set) = flow.with_navigator(|nav| nav.question_set().cloned()) else {
        return;
    };
    match write_csv_file(path, &set) {
        Ok(()) => println!("Wrote {}", path.display()),
        Err(err) => eprintln!("CSV export failed: {err}"),
    }
}

fn spawn_clock(flow: QuizFlow) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // the first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            let _ = flow.dispatch(Action::Tick);
        }
    })
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut draft = settings_draft_from_env();
    if let Some(base_url) = &args.base_url {
        draft.base_url = Some(base_url.clone());
    }
    let settings = draft.validate()?;
    info!(base_url = settings.base_url(), "using quiz server");

    let generator = Arc::new(HttpQuizGenerator::new(settings.clone())?);
    let flow = match &args.source {
        Source::Document(_) => QuizFlow::new(Navigator::generated(), generator),
        Source::SharedFile { slug, .. } => {
            QuizFlow::new(Navigator::shared(slug.clone()), generator)
                .with_leaderboard(Arc::new(HttpLeaderboardClient::new(settings)?))
        }
    };

    let clock = spawn_clock(flow.clone());
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let result = drive(&flow, &args, &mut input).await;
    clock.abort();
    result
}

/// Set up and run quizzes until the user quits.
async fn drive(
    flow: &QuizFlow,
    args: &Args,
    input: &mut Input,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        match set_up(flow, args, input).await? {
            Setup::Ready => {}
            Setup::Again => continue,
            Setup::Quit => return Ok(()),
        }
        println!("{}", console::help(Stage::Quiz));
        if let Exit::Quit = run_session(flow, args, input).await? {
            return Ok(());
        }
    }
}

#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
