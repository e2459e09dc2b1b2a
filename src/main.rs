use agentpro::assistant::composer::ASK_WHICH_PROMPT;
use agentpro::assistant::{SessionState, ShowroomAssistant, TurnReply};
use agentpro::catalog::StockApiClient;
use agentpro::config::{AppConfig, SUPPORTED_MODELS};
use agentpro::llm::gateways::{OpenAIConfig, OpenAIGateway};
use agentpro::llm::{ChatSession, LlmBroker};
use agentpro::AgentError;
use anyhow::{Context, Result};
use clap::builder::PossibleValuesParser;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Model to use (overrides AGENTPRO_MODEL).
    #[arg(long, global = true, value_parser = PossibleValuesParser::new(SUPPORTED_MODELS))]
    model: Option<String>,

    /// Sampling temperature between 0.0 and 2.0 (overrides AGENTPRO_TEMPERATURE).
    #[arg(long, global = true)]
    temperature: Option<f32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Ask the model a single question and print the answer.
    Ask {
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
    },
    /// Free-form chat with the model.
    Chat,
    /// Product assistant backed by the showroom stock API.
    Showroom,
}

/// What a line typed in an interactive session means.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Exit,
    Clear,
    Blank,
    /// `/modelo <name>`
    Model(&'a str),
    /// `/temperatura <value>`
    Temperature(&'a str),
    Message(&'a str),
}

impl<'a> Input<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            Input::Blank
        } else if line.eq_ignore_ascii_case("salir") {
            Input::Exit
        } else if line.eq_ignore_ascii_case("limpiar") {
            Input::Clear
        } else if let Some((command, value)) = line.split_once(char::is_whitespace) {
            if command.eq_ignore_ascii_case("/modelo") {
                Input::Model(value.trim())
            } else if command.eq_ignore_ascii_case("/temperatura") {
                Input::Temperature(value.trim())
            } else {
                Input::Message(line)
            }
        } else {
            Input::Message(line)
        }
    }
}

/// Apply a `/modelo` or `/temperatura` command; anything else is ignored.
///
/// Returns the text to show the user. Rejected values leave the broker unchanged.
fn apply_setting(broker: &mut LlmBroker, input: &Input<'_>) -> Option<String> {
    let outcome = match *input {
        Input::Model(model) => broker.reconfigure(model, broker.temperature()),
        Input::Temperature(raw) => match raw.parse::<f32>() {
            Ok(temperature) => {
                let model = broker.model().to_string();
                broker.reconfigure(&model, temperature)
            }
            Err(_) => Err(AgentError::ConfigError(format!(
                "temperature '{}' is not a number",
                raw
            ))),
        },
        _ => return None,
    };

    Some(match outcome {
        Ok(()) => format!(
            "⚙️ Modelo: {} | Temperatura: {}",
            broker.model(),
            broker.temperature()
        ),
        Err(e) => format!("❌ Error: {}", e),
    })
}

/// Prompt and read one line; `None` on end of input.
fn read_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = AppConfig::from_env()
        .context("Failed to read configuration")?
        .with_overrides(cli.model, cli.temperature);
    config.validate().context("Invalid configuration")?;

    info!(model = %config.model, temperature = config.temperature, "AgentPRO starting");

    let gateway = Arc::new(
        OpenAIGateway::with_config(OpenAIConfig {
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_endpoint.clone(),
            timeout: None,
        })
        .context("Failed to build model gateway")?,
    );
    let broker = LlmBroker::new(config.model.as_str(), gateway).with_temperature(config.temperature);

    match cli.command {
        Commands::Ask { question } => {
            let answer = broker.ask(question.join(" ")).await?;
            println!("{}", answer);
        }
        Commands::Chat => run_chat(ChatSession::new(broker)).await?,
        Commands::Showroom => {
            let source = Arc::new(
                StockApiClient::new(&config.stock_api_base)
                    .context("Failed to build stock API client")?,
            );
            run_showroom(ShowroomAssistant::new(broker, source)).await?;
        }
    }

    Ok(())
}

async fn run_chat(mut session: ChatSession) -> Result<()> {
    println!("🤖 Chat con IA iniciado!");
    println!("Escribe 'salir' para terminar la conversación");
    println!("Escribe 'limpiar' para borrar el historial de chat");
    println!("Usa '/modelo <nombre>' o '/temperatura <valor>' para cambiar la configuración");
    println!("{}", "-".repeat(50));

    while let Some(line) = read_line("\n👤 Tú: ")? {
        match Input::parse(&line) {
            Input::Exit => break,
            Input::Clear => {
                session.clear();
                println!("🧹 Historial de chat limpiado");
            }
            Input::Blank => {}
            setting @ (Input::Model(_) | Input::Temperature(_)) => {
                if let Some(text) = apply_setting(session.broker_mut(), &setting) {
                    println!("{}", text);
                }
            }
            Input::Message(query) => match session.send(query).await {
                Ok(response) => println!("\n🤖 IA: {}", response),
                Err(e) => {
                    println!("\n❌ Error: {}", e);
                    println!("Intenta de nuevo...");
                }
            },
        }
    }

    println!("👋 ¡Hasta luego!");
    Ok(())
}

async fn run_showroom(mut assistant: ShowroomAssistant) -> Result<()> {
    println!("🤖 AgentPRO - Chat con IA para tu showroom de lujo");
    println!(
        "Modelo: {} | Temperatura: {}",
        assistant.broker().model(),
        assistant.broker().temperature()
    );
    println!("Escribe 'salir' para terminar o 'limpiar' para borrar el chat");
    println!("Usa '/modelo <nombre>' o '/temperatura <valor>' para cambiar la configuración");
    println!("{}", "-".repeat(50));

    let mut state = SessionState::new();
    info!(session = %state.id(), "Showroom session started");

    while let Some(line) = read_line("\n👤 Tú: ")? {
        match Input::parse(&line) {
            Input::Exit => break,
            Input::Clear => {
                state.clear();
                println!("🧹 Historial de chat limpiado");
            }
            Input::Blank => {}
            setting @ (Input::Model(_) | Input::Temperature(_)) => {
                if let Some(text) = apply_setting(assistant.broker_mut(), &setting) {
                    println!("{}", text);
                }
            }
            Input::Message(query) => {
                let (next, reply) = assistant.process_turn(state, query).await;
                state = next;
                print_reply(&reply);
                println!("({} mensajes)", state.transcript().len());
            }
        }
    }

    println!("👋 ¡Hasta luego!");
    Ok(())
}

fn print_reply(reply: &TurnReply) {
    if let Some(display) = &reply.display {
        println!("\n**Productos encontrados:**");
        for card in &display.cards {
            println!("\n{}", card);
        }
        if display.ask_which {
            println!("\n{}", ASK_WHICH_PROMPT);
        }
    }
    println!("\n🤖 {}", reply.text);
}
