// ABOUTME: Command-line front end for hopper tools.
// ABOUTME: Lists tools, prints schemas, and invokes a tool against an in-memory canvas.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use hopper::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "hopper", version, about = "Run canvas tool providers from the shell")]
struct Cli {
    /// Log filter, e.g. "hopper=debug" (RUST_LOG wins when set)
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered tools
    List,

    /// Print a tool's descriptor as JSON
    Schema {
        /// Tool name
        tool: String,
    },

    /// Invoke a tool and print the ToolResult envelope
    Invoke {
        /// Tool name
        tool: String,

        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        arguments: String,

        /// Model for completion-backed tools
        #[arg(long)]
        model: Option<String>,

        /// Provider reported in metrics
        #[arg(long)]
        provider: Option<String>,

        /// Don't warn when a completion-backed tool reports no metrics
        #[arg(long)]
        skip_metrics_validation: bool,

        /// Components to place on the canvas first, by catalog name
        #[arg(long = "seed", value_name = "COMPONENT")]
        seed: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    hopper::logging::init(cli.log.as_deref());

    let registry = default_registry()?;

    match cli.command {
        Command::List => {
            for descriptor in registry.descriptors() {
                println!("{:<30} {}", descriptor.name, descriptor.description);
            }
        }
        Command::Schema { tool } => {
            let Some(descriptor) = registry.descriptor(&tool) else {
                bail!("Unknown tool: {}", tool);
            };
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
        }
        Command::Invoke {
            tool,
            arguments,
            model,
            provider,
            skip_metrics_validation,
            seed,
        } => {
            let arguments: serde_json::Value =
                serde_json::from_str(&arguments).context("arguments must be valid JSON")?;
            let ctx = build_context(&seed)?;

            let mut invocation = ToolInvocation::new(&tool, arguments);
            invocation.model = model;
            invocation.provider = provider;
            invocation.skip_metrics_validation = skip_metrics_validation;

            let result = registry.invoke(&invocation, &ctx).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.success {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn build_context(seed: &[String]) -> Result<ToolContext> {
    let config = Config::from_env()?;

    let mut canvas = MemoryCanvas::new();
    for name in seed {
        match canvas.add_component(name, Point::default()) {
            Some(guid) => println!("seeded {} {}", name, guid),
            None => bail!("Unknown component: {}", name),
        }
    }

    let mut ctx = ToolContext::new(config.clone())
        .with_canvas(CanvasHandle::spawn(canvas)?)
        .with_forum(ForumClient::from_config(&config)?);

    match OpenAIClient::from_config(&config) {
        Ok(client) => {
            info!(model = %config.model, "Completion backend configured");
            ctx = ctx.with_llm(
                Arc::new(client),
                Capabilities::from([Capability::JsonOutput, Capability::ToolCalling]),
            );
        }
        Err(e) => warn!(error = %e, "No completion backend; text tools are unavailable"),
    }

    Ok(ctx)
}
