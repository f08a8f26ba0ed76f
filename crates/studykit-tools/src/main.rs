use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use studykit_core::{KnowledgePointContext, MemoryCredentialStore, Sender, TranscriptSurface};
use studykit_intervention::{InterventionConfig, InterventionMonitor};
use studykit_session::{MemorySessionBackend, StudyTimer, TimerConfig, format_elapsed, format_seconds};

#[derive(Parser)]
#[command(name = "studykit-tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a short study session against the in-memory ledger.
    Demo {
        /// How long to let the timer run.
        #[arg(long, default_value_t = 5)]
        seconds: u64,
        /// Quiz failures to inject.
        #[arg(long, default_value_t = 2)]
        failures: u32,
        #[arg(long, default_value = "Recursion")]
        title: String,
    },
    /// Format an elapsed-seconds value for display.
    Format {
        seconds: f64,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Demo {
            seconds,
            failures,
            title,
        } => demo(seconds, failures, title).await,
        Commands::Format { seconds } => {
            println!("{}", format_elapsed(seconds));
        }
    }
}

async fn demo(seconds: u64, failures: u32, title: String) {
    let backend = Arc::new(MemorySessionBackend::new());
    let credentials = Arc::new(MemoryCredentialStore::with_token("demo-token"));
    let surface = Arc::new(TranscriptSurface::new(32));
    let context = KnowledgePointContext::new("demo-kp", title);

    let timer = StudyTimer::new(
        backend.clone(),
        credentials,
        Some(context.id.clone()),
        TimerConfig::default(),
    );
    let monitor = InterventionMonitor::spawn(
        InterventionConfig::default(),
        Some(context.clone()),
        surface.clone(),
    );

    timer.start().await;
    for _ in 0..failures {
        monitor.record_failure();
    }
    tokio::time::sleep(Duration::from_secs(seconds)).await;
    timer.stop().await;

    println!(
        "studied \"{}\" for {}",
        context.title,
        format_seconds(timer.elapsed_seconds())
    );
    println!(
        "ledger: {} begun / {} heartbeats / {} ended",
        backend.sessions_begun(),
        backend.heartbeats_received(),
        backend.sessions_ended()
    );
    for message in surface.messages() {
        let who = match message.from {
            Sender::Assistant => "assistant",
            Sender::Learner => "learner",
        };
        println!("[{who}] {}", message.text);
    }
}
