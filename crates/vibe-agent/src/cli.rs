use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vibe-agent", version, about = "Autonomous coding agent: plan, act, verify, repair")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a task against the current workspace
    Run {
        /// Task description; reads from stdin if omitted
        goal: Option<String>,
    },

    /// Inspect or reset the active policy document
    Policy {
        #[command(subcommand)]
        cmd: PolicyCommands,
    },

    /// Inspect the persisted project memory document
    Memory {
        #[command(subcommand)]
        cmd: MemoryCommands,
    },
}

#[derive(Subcommand)]
pub enum PolicyCommands {
    /// Print the active policy as JSON
    Show,
}

#[derive(Subcommand)]
pub enum MemoryCommands {
    /// Print the current project memory document as JSON
    Show,
}
