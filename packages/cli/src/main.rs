use clap::Parser;

use baglens_cli::Options;
use baglens_session::Multiplexer;

/// baglens - print the records of a log as JSON lines
#[derive(Parser, Debug)]
#[command(name = "baglens")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the log (`~` and `$VAR` are expanded)
    log: String,

    /// Channel to read; repeat for several. Defaults to every channel.
    #[arg(short, long = "channel")]
    channels: Vec<String>,

    /// Include channel, timestamp and type name with each record
    #[arg(long)]
    meta: bool,

    /// Stop after this many records
    #[arg(long)]
    limit: Option<usize>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let options = Options {
        log: args.log,
        channels: args.channels,
        meta: args.meta,
        limit: args.limit,
    };

    let mut mux = Multiplexer::new();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Err(e) = baglens_cli::run(&mut mux, &options, &mut out) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
