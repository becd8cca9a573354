use crate::board::Board;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "propblocks-rs",
    about = "Generates Propeller C from a Blockly workspace exported by the block editor."
)]
pub struct Args {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Where to write the C program. Printed to stdout when omitted.
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        value_name = "BOARD",
        help = "Target board (activity-board, flip, heb, heb-wx, s3, other). Overrides the workspace's board attribute."
    )]
    pub board: Option<Board>,

    #[arg(long, value_name = "PATH", help = "Write generation diagnostics as JSON to this path.")]
    pub diagnostics_json: Option<PathBuf>,

    #[arg(long, help = "Exit with an error when any block produced a warning or error.")]
    pub strict: bool,

    #[arg(short, long, help = "Log generation details to stderr.")]
    pub verbose: bool,
}
