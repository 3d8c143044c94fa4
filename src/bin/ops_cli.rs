use clap::Parser;
use ops_assistant::display::render_report;
use ops_assistant::{logging, Assistant, Settings, TaskReport};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const DEMO_TASK: &str = "Find AI repositories and check Tokyo weather";

const EXAMPLE_TASKS: [&str; 4] = [
    "Find top 5 Python machine learning repositories",
    "Check weather in London and Paris",
    "Search for React projects and get weather in Tokyo",
    "Find Rust repositories and check Berlin weather",
];

#[derive(Parser)]
#[command(name = "ops-cli")]
#[command(about = "Run natural-language tasks against GitHub and weather APIs")]
#[command(version)]
struct Args {
    /// Task to process, e.g. "Find Rust repositories and check Berlin weather"
    task: Option<String>,

    /// Read tasks from stdin until quit
    #[arg(short, long)]
    interactive: bool,

    /// Run the built-in example tasks
    #[arg(short, long)]
    example: bool,

    /// File to save the JSON report to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file to load instead of config/default.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    if args.verbose {
        settings.logging.level = "debug".to_string();
    }
    logging::init(&settings.logging);

    let assistant = Assistant::from_settings(&settings)?;

    if args.example {
        run_examples(&assistant).await
    } else if args.interactive {
        run_interactive(&assistant, args.output.as_deref()).await
    } else if let Some(task) = &args.task {
        match assistant.process_task(task).await {
            Ok(report) => {
                println!("{}", render_report(&report));
                save_report(&report, &output_path(args.output.as_deref()))
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        run_demo(&assistant).await
    }
}

async fn run_examples(assistant: &Assistant) -> Result<(), Box<dyn std::error::Error>> {
    for (i, task) in EXAMPLE_TASKS.iter().enumerate() {
        println!("\nExample {}/{}: {}", i + 1, EXAMPLE_TASKS.len(), task);

        let report = assistant.process_task(task).await?;
        println!("{}", render_report(&report));
        save_report(&report, Path::new(&format!("example_{}_results.json", i + 1)))?;
    }
    Ok(())
}

async fn run_interactive(assistant: &Assistant, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Ops Assistant interactive mode. Type 'quit' to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"\nTask> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let task = line.trim();

        if task.is_empty() {
            continue;
        }
        if matches!(task.to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }

        match assistant.process_task(task).await {
            Ok(report) => {
                println!("{}", render_report(&report));
                save_report(&report, &output_path(output))?;
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    println!("Goodbye!");
    Ok(())
}

async fn run_demo(assistant: &Assistant) -> Result<(), Box<dyn std::error::Error>> {
    println!("Running demo task: {}", DEMO_TASK);

    let report = assistant.process_task(DEMO_TASK).await?;
    println!("{}", render_report(&report));

    println!("\nUsage:");
    println!("  ops-cli \"<task>\"        process a single task");
    println!("  ops-cli --interactive   read tasks from stdin");
    println!("  ops-cli --example       run the example tasks");
    Ok(())
}

fn output_path(output: Option<&Path>) -> PathBuf {
    output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("task_result_{}.json", chrono::Utc::now().timestamp())))
}

fn save_report(report: &TaskReport, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    println!("Results saved to {}", path.display());
    Ok(())
}
