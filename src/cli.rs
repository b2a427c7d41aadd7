use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use docqa::chunker::{ChunkerConfig, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};
use docqa::error::{Error, Result};
use docqa::vector_store::DEFAULT_TOP_K;

#[derive(Debug, Parser)]
#[command(
    name = "docqa",
    about = "Ask questions about API documentation from your terminal"
)]
pub struct Cli {
    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Split documents into retrieval chunks and print them
    Chunk(ChunkArgs),
    /// Retrieve the chunks most relevant to a query
    Search(SearchArgs),
    /// Print the rendered generation prompt for a query
    Prompt(PromptArgs),
    /// Answer a question via an external generation command
    Ask(AskArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

/// Sliding-window overrides shared by all ingesting commands.
#[derive(Debug, Args)]
pub struct ChunkingOpts {
    /// Chunk length in characters
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Overlap between adjacent chunks in characters
    #[arg(long, default_value_t = DEFAULT_OVERLAP)]
    pub overlap: usize,
}

impl ChunkingOpts {
    pub fn config(&self) -> Result<ChunkerConfig> {
        if self.chunk_size == 0 {
            return Err(Error::Config(
                "--chunk-size must be greater than zero".to_string(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::Config(format!(
                "--overlap ({}) must be smaller than --chunk-size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(ChunkerConfig {
            chunk_size: self.chunk_size,
            overlap: self.overlap,
        })
    }
}

#[derive(Debug, Parser)]
pub struct ChunkArgs {
    /// Documentation files to chunk (.md or .txt)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub chunking: ChunkingOpts,

    /// Output chunks as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query
    pub query: String,

    /// Documentation files to index (.md or .txt)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Number of results to return
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_K)]
    pub count: usize,

    #[command(flatten)]
    pub chunking: ChunkingOpts,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct PromptArgs {
    /// The question to build a prompt for
    pub query: String,

    /// Documentation files to index (.md or .txt)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Number of retrieved chunks to include
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_K)]
    pub count: usize,

    #[command(flatten)]
    pub chunking: ChunkingOpts,
}

#[derive(Debug, Parser)]
pub struct AskArgs {
    /// The question to answer
    pub query: String,

    /// Documentation files to index (.md or .txt)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Shell command that turns a prompt on stdin into an answer on
    /// stdout (e.g. an LLM CLI)
    #[arg(long, value_name = "COMMAND")]
    pub via: String,

    /// Number of retrieved chunks to include
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_K)]
    pub count: usize,

    #[command(flatten)]
    pub chunking: ChunkingOpts,

    /// Output the structured response as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "docqa",
            &mut std::io::stdout(),
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parse_search_defaults() {
        let cli = Cli::parse_from(["docqa", "search", "auth", "api.md"]);
        match cli.command {
            Command::Search(args) => {
                assert_eq!(args.query, "auth");
                assert_eq!(args.files, vec![PathBuf::from("api.md")]);
                assert_eq!(args.count, 5);
                assert_eq!(args.chunking.chunk_size, DEFAULT_CHUNK_SIZE);
                assert_eq!(args.chunking.overlap, DEFAULT_OVERLAP);
                assert!(!args.json);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn parse_ask_requires_via() {
        assert!(Cli::try_parse_from(["docqa", "ask", "q", "api.md"]).is_err());
        let cli = Cli::parse_from([
            "docqa", "ask", "q", "api.md", "--via", "cat",
        ]);
        match cli.command {
            Command::Ask(args) => assert_eq!(args.via, "cat"),
            _ => panic!("expected ask command"),
        }
    }

    #[test]
    fn chunking_opts_reject_degenerate_stride() {
        let opts = ChunkingOpts {
            chunk_size: 100,
            overlap: 100,
        };
        assert!(opts.config().is_err());

        let opts = ChunkingOpts {
            chunk_size: 0,
            overlap: 0,
        };
        assert!(opts.config().is_err());
    }
}
