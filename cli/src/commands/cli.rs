use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "taskweave", version, about = "Run agent tasks with retries and tool calling")]
pub struct Args {
    /// Explicit config file. Defaults to ~/.taskweave/config.toml, then ./config.toml.
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, register and execute one agent task.
    Run(RunArgs),
    /// List the registered (category, platform) tool builders.
    Tools,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    #[arg(long)]
    pub instructions: String,

    /// Task parameter (KEY=VALUE). Can be specified multiple times.
    #[arg(long = "param", value_parser = parse_key_val, action = clap::ArgAction::Append)]
    pub params: Vec<(String, String)>,

    /// Attempt budget; falls back to `[executor].max_retries`.
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Derive the task id from instructions and parameters.
    #[arg(long)]
    pub deterministic_id: bool,

    /// Toolkit to give the agent. Can be specified multiple times.
    #[arg(long = "toolkit", action = clap::ArgAction::Append)]
    pub toolkits: Vec<String>,
}

pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
