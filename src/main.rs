use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{AskArgs, ChunkArgs, Cli, Command, PromptArgs, SearchArgs};
use docqa::{
    chunker::{self, Chunk, ChunkerConfig},
    error::{Error, Result},
    loader,
    pipeline::{self, CommandGenerator, Pipeline},
    prompts,
    vector_store::{Retrieved, VectorStore},
};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("DOCQA_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Chunk(args) => cmd_chunk(&args)?,
        Command::Search(args) => cmd_search(&args)?,
        Command::Prompt(args) => cmd_prompt(&args)?,
        Command::Ask(args) => cmd_ask(&args)?,
        Command::Completions(args) => args.generate(),
    }

    Ok(())
}

/// Load, chunk, and index documents, one `add` per document.
fn build_store(
    files: &[PathBuf],
    config: &ChunkerConfig,
) -> Result<VectorStore> {
    let documents = loader::load_documents(files)?;
    let mut store = VectorStore::new();

    for (path, pages) in files.iter().zip(&documents) {
        let chunks = chunker::chunk_pages(pages, config);
        tracing::info!(
            path = %path.display(),
            pages = pages.len(),
            chunks = chunks.len(),
            "indexed document"
        );
        store.add_chunks(chunks);
    }

    Ok(store)
}

fn cmd_chunk(args: &ChunkArgs) -> Result<()> {
    let config = args.chunking.config()?;
    let documents = loader::load_documents(&args.files)?;
    let chunks: Vec<Chunk> = documents
        .iter()
        .flat_map(|pages| chunker::chunk_pages(pages, &config))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&chunks)?);
    } else {
        for (i, chunk) in chunks.iter().enumerate() {
            println!(
                "--- chunk {} (page {}, section {}) ---",
                i + 1,
                chunk
                    .metadata
                    .page_number
                    .map_or("unknown".to_string(), |n| n.to_string()),
                chunk.metadata.section_name.as_deref().unwrap_or("unknown"),
            );
            println!("{}", preview(&chunk.text));
        }
        println!("\n{} chunk(s)", chunks.len());
    }

    Ok(())
}

fn cmd_search(args: &SearchArgs) -> Result<()> {
    let config = args.chunking.config()?;
    let store = build_store(&args.files, &config)?;
    let results = store.retrieve(&args.query, args.count);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        format_human(&results);
    }

    Ok(())
}

fn cmd_prompt(args: &PromptArgs) -> Result<()> {
    let config = args.chunking.config()?;
    let store = build_store(&args.files, &config)?;

    let (template, _) = pipeline::select_template(&args.query);
    let retrieved = store.retrieve(&args.query, args.count);
    if retrieved.is_empty() {
        println!("{}", prompts::NOT_FOUND_ANSWER);
        return Ok(());
    }

    let docs = pipeline::docs_text(&retrieved);
    print!("{}", prompts::render(template, &docs, &args.query));
    Ok(())
}

fn cmd_ask(args: &AskArgs) -> Result<()> {
    let config = args.chunking.config()?;
    let store = build_store(&args.files, &config)?;

    let generator = CommandGenerator::new(args.via.as_str());
    let pipeline = Pipeline::new(generator).with_top_k(args.count);
    let response = pipeline.run(&store, &args.query);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if let Some(message) = response.error {
        return Err(Error::Generation(message));
    }

    if let Some(answer) =
        response.explanation.as_deref().or(response.code_snippet.as_deref())
    {
        println!("{answer}");
    }

    if !response.source_citations.is_empty() {
        println!("\nSources:");
        for citation in &response.source_citations {
            println!("  - {citation}");
        }
    }

    Ok(())
}

fn format_human(results: &[Retrieved]) {
    if results.is_empty() {
        println!("No results found.");
        return;
    }

    let citations = pipeline::citations(results);
    for (i, (result, citation)) in
        results.iter().zip(&citations).enumerate()
    {
        println!("{:>3}. {citation}", i + 1);
        println!("     {}", preview(&result.text));
    }
    println!("\n{} result(s)", results.len());
}

/// First line of a chunk, truncated for terminal display.
fn preview(text: &str) -> String {
    const MAX_CHARS: usize = 100;

    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let mut out: String = line.trim().chars().take(MAX_CHARS).collect();
    if line.trim().chars().count() > MAX_CHARS {
        out.push_str("...");
    }
    out
}
