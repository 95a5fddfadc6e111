//! Workback - Working Backwards planning agent
//!
//! Main entry point for the CLI application.

use std::sync::Arc;

use clap::Parser;
use workback::agent::{default_roles, HybridAgent};
use workback::tools::{EchoTool, TerminateTool};
use workback::{Agent, ChatClient, Config, PlanningAgent, ToolRegistry};

/// Workback - Working Backwards planning agent
#[derive(Parser, Debug)]
#[command(name = "workback")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Goal for the agent to work towards
    goal: String,

    /// Chat model to use
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    #[arg(long)]
    base_url: Option<String>,

    /// Cap on forward execution steps
    #[arg(long)]
    max_steps: Option<usize>,

    /// Run the multi-agent hybrid instead of the plain planner
    #[arg(long)]
    hybrid: bool,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(ref model) = args.model {
        config.llm.model = model.clone();
    }

    if let Some(ref base_url) = args.base_url {
        config.llm.base_url = base_url.clone();
    }

    if let Some(max_steps) = args.max_steps {
        config.agent.max_steps = max_steps;
    }

    if args.debug {
        config.agent.debug = true;
    }

    let provider = Arc::new(ChatClient::from_config(&config));

    let mut tools = ToolRegistry::new();
    tools.add(Arc::new(TerminateTool::new()));
    tools.add(Arc::new(EchoTool::new()));

    if args.hybrid {
        let mut agent = HybridAgent::new("workback", provider, tools, default_roles(), &config);
        let summary = agent.run(Some(&args.goal)).await?;
        println!("{}", summary);
        return Ok(());
    }

    let mut agent = PlanningAgent::new("workback", provider, &config).with_tools(tools);
    let summary = agent.run(Some(&args.goal)).await?;

    println!("{}", summary);
    println!();
    println!("{}", agent.execution_status());

    Ok(())
}
