use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use courier_core::{ADD, CompletionHandler, EventLoop, HostValue, TaskError, default_module};

#[derive(Parser)]
#[command(name = "courier", version, about = "Submit work to the courier event loop")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// add(a, b, callback): arguments are JSON literals, anything else is a string
    Add {
        args: Vec<String>,

        /// Do not pass a callback (exercises synchronous rejection)
        #[arg(long)]
        no_callback: bool,

        /// Print the callback arguments as JSON
        #[arg(long)]
        json: bool,
    },
}

/// callback が受け取った (error, value)
#[derive(Debug, Serialize)]
struct Report {
    error: Option<TaskError>,
    value: Option<serde_json::Value>,
    #[serde(skip)]
    text: Option<String>,
}

fn parse_arg(raw: &str) -> HostValue {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => HostValue::from(value),
        Err(_) => HostValue::from(raw),
    }
}

fn to_json(value: &HostValue) -> serde_json::Value {
    match value {
        HostValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(value.to_string())),
        HostValue::Bool(b) => serde_json::Value::Bool(*b),
        HostValue::Null | HostValue::Undefined => serde_json::Value::Null,
        other => serde_json::Value::String(other.to_string()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Add {
            args,
            no_callback,
            json,
        } => run_add(&args, no_callback, json).await,
    }
}

async fn run_add(raw: &[String], no_callback: bool, json: bool) -> ExitCode {
    let module = match default_module() {
        Ok(module) => module,
        Err(e) => {
            error!(error = %e, "failed to build module");
            return ExitCode::FAILURE;
        }
    };

    let reports: Arc<Mutex<Vec<Report>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reports);
    let callback = CompletionHandler::new(move |_, error, value| {
        let report = Report {
            error,
            value: value.as_ref().map(to_json),
            text: value.as_ref().map(HostValue::to_string),
        };
        if let Ok(mut reports) = sink.lock() {
            reports.push(report);
        }
    });

    // callback は 3 番目（足りなければ末尾）に置く
    let mut args: Vec<HostValue> = raw.iter().map(|s| parse_arg(s)).collect();
    if !no_callback {
        let at = args.len().min(2);
        args.insert(at, HostValue::from(callback));
    }
    debug!(argc = args.len(), "calling {ADD}");

    let mut event_loop = EventLoop::new();
    if let Err(e) = module.call(ADD, &event_loop.dispatcher(), &args) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    event_loop.run_until_idle().await;

    let reports = match reports.lock() {
        Ok(reports) => reports,
        Err(_) => return ExitCode::FAILURE,
    };
    let mut code = ExitCode::SUCCESS;
    for report in reports.iter() {
        if json {
            match serde_json::to_string(report) {
                Ok(line) => println!("{line}"),
                Err(e) => error!(error = %e, "failed to encode report"),
            }
        } else {
            match (&report.error, &report.text) {
                (Some(error), _) => println!("error: {error}"),
                (None, Some(value)) => println!("{value}"),
                (None, None) => println!("undefined"),
            }
        }
        if report.error.is_some() {
            code = ExitCode::FAILURE;
        }
    }
    code
}
