#![forbid(unsafe_code)]

mod command;
mod render;

use std::fmt;
use std::sync::Arc;

use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use quiz_core::Question;
use quiz_services::{
    CommandConverter, ExtractionService, HttpFetcher, LoadError, LoadOrigin,
    LoadRequest, LoadSource, LoadTicket, QuizConfig, QuizController, QuizLoader, StartupParams,
};

use crate::command::{Command, HELP};
use crate::render::render;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidValue { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidValue { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
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
    eprintln!(
        "  quizdoc [--query <startup query>] [--default-source <url>] [--share-base <url>] [--converter <program>]"
    );
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  quizdoc --query 'url=https://example.com/quiz.docx'");
    eprintln!("  quizdoc --query '?quiz=<token from a share link>'");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_AI_API_KEY, QUIZ_AI_BASE_URL, QUIZ_AI_MODEL");
    eprintln!("  QUIZ_DEFAULT_SOURCE, QUIZ_SHARE_BASE, QUIZ_CONVERTER, RUST_LOG");
}

#[derive(Debug, Default)]
struct Args {
    query: Option<String>,
    default_source: Option<String>,
    share_base: Option<String>,
    converter: Option<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--query" => parsed.query = Some(require_value(args, "--query")?),
                "--default-source" => {
                    parsed.default_source = Some(require_value(args, "--default-source")?);
                }
                "--share-base" => parsed.share_base = Some(require_value(args, "--share-base")?),
                "--converter" => {
                    let value = require_value(args, "--converter")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidValue {
                            flag: "--converter",
                            raw: value,
                        });
                    }
                    parsed.converter = Some(value);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(parsed)
    }

    fn config(&self) -> Result<QuizConfig, Box<dyn std::error::Error>> {
        Ok(self.apply(QuizConfig::from_env()?)?)
    }

    /// Flags override whatever `base` was read from.
    fn apply(&self, mut config: QuizConfig) -> Result<QuizConfig, ArgsError> {
        if let Some(raw) = &self.share_base {
            config = config
                .with_share_base(raw)
                .map_err(|_| ArgsError::InvalidValue {
                    flag: "--share-base",
                    raw: raw.clone(),
                })?;
        }
        if let Some(raw) = &self.default_source {
            config = config
                .with_default_source(Some(raw.clone()))
                .map_err(|_| ArgsError::InvalidValue {
                    flag: "--default-source",
                    raw: raw.clone(),
                })?;
        }
        Ok(config)
    }
}

struct LoadCompletion {
    ticket: LoadTicket,
    result: Result<Vec<Question>, LoadError>,
}

fn dispatch(
    loader: &QuizLoader,
    completions: &mpsc::UnboundedSender<LoadCompletion>,
    request: LoadRequest,
) {
    let loader = loader.clone();
    let completions = completions.clone();
    tokio::spawn(async move {
        let result = loader.load(&request.source).await;
        // The receiver only goes away on shutdown.
        let _ = completions.send(LoadCompletion {
            ticket: request.ticket,
            result,
        });
    });
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let config = args.config()?;
    let converter = match &args.converter {
        Some(program) => CommandConverter::new(program.clone()),
        None => CommandConverter::from_env(),
    };
    let extractor = ExtractionService::from_env();
    if !extractor.enabled() {
        warn!("QUIZ_AI_API_KEY is not set; documents cannot be analysed");
    }
    let loader = QuizLoader::new(
        Arc::new(HttpFetcher::new()),
        Arc::new(converter),
        Arc::new(extractor),
    );

    let mut controller = QuizController::new(config);
    let (completions, mut completed) = mpsc::unbounded_channel::<LoadCompletion>();

    let params = args
        .query
        .as_deref()
        .map(StartupParams::from_query)
        .unwrap_or_default();
    if let Some(request) = controller.start(params) {
        dispatch(&loader, &completions, request);
    }
    print!("{}", render(&controller));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let command = match Command::parse(&line) {
                    Ok(command) => command,
                    Err(err) => {
                        println!("{err}");
                        continue;
                    }
                };
                if command == Command::Quit {
                    break;
                }
                handle(&mut controller, &loader, &completions, command);
            }
            Some(done) = completed.recv() => {
                controller.complete_load(done.ticket, done.result);
                print!("{}", render(&controller));
            }
        }
    }

    info!("exiting");
    Ok(())
}

fn handle(
    controller: &mut QuizController,
    loader: &QuizLoader,
    completions: &mpsc::UnboundedSender<LoadCompletion>,
    command: Command,
) {
    let result = match command {
        Command::File(path) => {
            load(controller, loader, completions, LoadSource::File(path));
            Ok(())
        }
        Command::Url(url) => {
            load(controller, loader, completions, LoadSource::Url(url));
            Ok(())
        }
        Command::Select(option) => controller.select_answer(option).map(drop),
        Command::Next => controller.advance().map(drop),
        Command::Prev => controller.retreat().map(drop),
        Command::Finish => controller.finish().map(drop),
        Command::Share => {
            match controller.share_link() {
                Ok(link) => println!("{link}"),
                Err(err) => println!("{err}"),
            }
            return;
        }
        Command::Reset => {
            if let Some(request) = controller.reset() {
                dispatch(loader, completions, request);
            }
            Ok(())
        }
        Command::Help => {
            println!("{HELP}");
            return;
        }
        Command::Show | Command::Quit => Ok(()),
    };

    match result {
        Ok(()) => print!("{}", render(controller)),
        Err(err) => println!("{err}"),
    }
}

fn load(
    controller: &mut QuizController,
    loader: &QuizLoader,
    completions: &mpsc::UnboundedSender<LoadCompletion>,
    source: LoadSource,
) {
    match controller.request_load(source, LoadOrigin::Interactive) {
        Some(request) => dispatch(loader, completions, request),
        None if controller.is_loading() => println!("a document is already loading"),
        None => println!("use `reset` before loading another quiz"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
