use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sb2-stats",
    about = "Count scripts, assets and blocks by category in Scratch 2 (.sb2) projects."
)]
pub struct Args {
    #[arg(value_name = "INPUT", help = "A .sb2 archive or a bare project.json.")]
    pub input: PathBuf,

    #[arg(value_name = "OUTPUT", help = "Write the report here instead of stdout.")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Emit the report as JSON.")]
    pub json: bool,

    #[arg(
        long,
        value_name = "REGEX",
        help = "Only report sprites whose name matches this pattern. The stage is always reported."
    )]
    pub sprite: Option<String>,

    #[arg(
        long,
        help = "Fail when a sprite omits variables/lists/scriptComments/sounds/costumes. Scratch 2 leaves empty ones out, so by default they read as empty."
    )]
    pub strict: bool,

    #[arg(short, long, help = "Print debug diagnostics to stderr.")]
    pub verbose: bool,
}
