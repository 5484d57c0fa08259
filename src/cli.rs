use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfslice")]
#[command(about = "Slice a PDF into a subset of its pages")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp,

    /// Display PDF page count and metadata
    Info {
        /// PDF file to inspect
        path: PathBuf,

        /// Password for encrypted PDFs
        #[arg(long)]
        password: Option<String>,
    },

    /// Write selected pages of a PDF to a new file
    #[command(alias = "cut")]
    Slice(SliceArgs),
}

#[derive(Args)]
#[command(group(ArgGroup::new("selection").required(true).args(["pages", "all", "odd", "even"])))]
pub struct SliceArgs {
    /// PDF file to slice
    pub path: PathBuf,

    /// Page ranges (e.g., 1-3, 8, 10-12)
    pub pages: Option<String>,

    /// Select every page
    #[arg(long)]
    pub all: bool,

    /// Select the odd pages
    #[arg(long)]
    pub odd: bool,

    /// Select the even pages
    #[arg(long)]
    pub even: bool,

    /// Output file; ".pdf" is appended when missing
    #[arg(short, long, default_value = "sliced_output.pdf")]
    pub output: String,

    /// Remove the selected pages instead of keeping them
    #[arg(short, long)]
    pub delete: bool,

    /// Keep pages in the order they were typed instead of ascending
    #[arg(short, long)]
    pub keep_order: bool,

    /// Password for encrypted PDFs (prompted for when omitted)
    #[arg(long)]
    pub password: Option<String>,

    /// Do not copy document metadata into the output
    #[arg(long)]
    pub no_metadata: bool,

    /// Open the output with the system viewer when done
    #[arg(long)]
    pub open: bool,
}
