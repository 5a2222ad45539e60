use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfpick")]
#[command(about = "Pick pages out of a PDF, from the browser or the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web UI and HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, env = "PDFPICK_BIND", default_value = "0.0.0.0:3000")]
        bind: SocketAddr,

        /// Directory for uploaded and extracted PDFs
        #[arg(long, env = "PDFPICK_STORAGE_DIR", default_value = "./temp")]
        storage_dir: PathBuf,

        /// Maximum upload size in bytes
        #[arg(long, env = "PDFPICK_MAX_UPLOAD_BYTES", default_value_t = 25 * 1024 * 1024)]
        max_upload_bytes: usize,
    },

    /// Extract pages to a new PDF, in the order given
    #[command(alias = "cat")]
    Extract {
        /// PDF file to extract from
        path: PathBuf,

        /// Pages (e.g., "3,1,5-end" or "9-6")
        pages: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Display PDF metadata
    Info {
        /// PDF file to inspect
        path: PathBuf,
    },
}
