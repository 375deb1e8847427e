//! CLI entry point for stippling images

use clap::Parser;
use fieldstipple::io::cli::{Cli, FileProcessor};

fn main() -> fieldstipple::Result<()> {
    let cli = Cli::parse();
    let mut processor = FileProcessor::new(cli);
    processor.process()
}
