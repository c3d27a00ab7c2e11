use crate::{
    core::{steps::AgentStep, Agent, Context},
    schemas::ArgumentValidator,
    types::RunResult,
    AgentConfig,
};
use anyhow::{Context as _, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};

const PROMPT: &str = "Enter a question: ";

fn command() -> Command {
    Command::new("prompt-agent")
        .version("0.1.0")
        .about("Answer questions with an LLM that can call weather, transcript, flight and web search tools")
        .arg(
            Arg::new("prompt")
                .help("Answer this question once and exit instead of reading stdin")
                .index(1),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .help("Chat model to use (or set OPENAI_MODEL env var)"),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .help("OpenAI API key (or set OPENAI_API_KEY env var)"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .help("Chat completions base URL (or set OPENAI_BASE_URL env var)"),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .help("Model request timeout in seconds")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("max-tokens")
                .long("max-tokens")
                .value_name("COUNT")
                .help("Completion token limit per request")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("strict-arguments")
                .long("strict-arguments")
                .help("Check tool arguments against their JSON Schema before calling the tool")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("trace")
                .long("trace")
                .help("Print the full step trace after each answer")
                .action(ArgAction::SetTrue),
        )
}

/// Resolve configuration from the environment, then apply command-line overrides
fn load_config(matches: &ArgMatches) -> Result<AgentConfig> {
    let mut config = match matches.get_one::<String>("api-key") {
        Some(key) => AgentConfig::new(key.clone()).with_env_overrides(),
        None => AgentConfig::from_env()
            .context("an API key is required: set OPENAI_API_KEY or pass --api-key")?,
    };

    if let Some(model) = matches.get_one::<String>("model") {
        config.model = model.clone();
    }
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.base_url = base_url.clone();
    }
    if let Some(seconds) = matches.get_one::<u64>("timeout") {
        config.timeout = Duration::from_secs(*seconds);
    }
    if let Some(max_tokens) = matches.get_one::<u32>("max-tokens") {
        config.max_tokens = Some(*max_tokens);
    }
    if matches.get_flag("strict-arguments") {
        config.argument_validator = ArgumentValidator::Strict;
    }

    Ok(config)
}

/// CLI entry point for the prompt-agent tool
pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let matches = command().get_matches();
    let config = load_config(&matches)?;
    let trace = matches.get_flag("trace");

    let agent = Agent::from_config(&config);
    info!(
        model = %config.model,
        base_url = %config.base_url,
        tools = ?agent.registry().names(),
        "agent ready"
    );

    if let Some(question) = matches.get_one::<String>("prompt") {
        let result = agent
            .answer(question, None)
            .await
            .context("failed to answer question")?;
        print_result(&result, trace);
        return Ok(());
    }

    let mut context: Option<Context> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(PROMPT.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }

        match agent.answer(question, context.as_ref()).await {
            Ok(result) => {
                print_result(&result, trace);
                if let Some(next) = result.context {
                    context = Some(next);
                }
            }
            Err(e) => {
                error!("Question failed: {}", e);
                println!("{}", e.to_error_payload());
            }
        }
    }

    Ok(())
}

fn print_result(result: &RunResult, trace: bool) {
    for step in &result.steps {
        match step {
            AgentStep::ModelReply { round: 1, raw } => {
                println!("First LLM response:\n{}", raw);
            }
            AgentStep::Observation {
                tool_name, result, ..
            } => {
                println!("Output of {}: {}", tool_name, result.to_json());
            }
            AgentStep::Skipped { tool_name, reason } => {
                println!("Skipped {}: {}", tool_name, reason);
            }
            _ => {}
        }
    }

    println!("Here is the LLM response:\n{}", result.output());

    if trace {
        println!("\n{}", result.replay());
    }
}
