use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use simplelog::{ConfigBuilder, WriteLogger};

use openaictl::core::config::{self, CliOverrides};
use openaictl::inference::OpenAiProvider;
use openaictl::repl;

#[derive(Parser)]
#[command(
    name = "openaictl",
    about = "Interactive chatbot for OpenAI-compatible endpoints"
)]
struct Args {
    /// Model identifier sent with every request
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum output tokens per reply
    #[arg(long)]
    max_tokens: Option<u32>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let cli = CliOverrides {
        model: args.model,
        max_tokens: args.max_tokens,
    };
    let resolved = match config::resolve(&file_config, &cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize file logger - writes to openaictl.log in current directory,
    // keeping the terminal clean for the conversation itself.
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("openaictl.log") {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    log::info!("openaictl starting up with model: {}", resolved.model);

    let provider = Arc::new(OpenAiProvider::new(
        resolved.api_key.clone(),
        Some(resolved.base_url.clone()),
    ));

    match repl::run(provider, &resolved).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Fatal: {}", e);
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
