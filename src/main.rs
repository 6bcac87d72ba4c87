//! livecheck CLI
//!
//! Usage:
//!   livecheck --frames session.jsonl          # Replay recorded detector output
//!   livecheck --interactive                   # Type frames: face l=0.1 r=0.1 | none | error <msg>
//!   livecheck --frames session.jsonl --json   # JSON output

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use log::{error, warn};

use livecheck::core::{replay_source, FrameSource, LineSource, LivenessSession, SessionSummary};
use livecheck::logger::setup_logger;
use livecheck::types::{DirectionalCue, LivenessState, StepOutput};
use livecheck::{LivenessConfig, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "livecheck",
    version = VERSION,
    about = "Active liveness check - blink, turn left, smile",
    long_about = "livecheck drives a face-detection signal stream through the liveness\n\
                  sequence and reports each step.\n\n\
                  Steps:\n  \
                  BLINK      - both eye-open probabilities <= 0.35\n  \
                  TURN_LEFT  - head yaw < -15 degrees\n  \
                  SMILE      - smile probability >= 0.70\n  \
                  DONE       - liveness passed\n\n\
                  A step left unfinished for 15 seconds restarts the sequence."
)]
struct Args {
    /// JSON-lines file of recorded frames to replay
    #[arg(short, long)]
    frames: Option<String>,

    /// Interactive mode - read text commands from stdin
    #[arg(short, long)]
    interactive: bool,

    /// JSON config file with thresholds
    #[arg(short, long)]
    config: Option<String>,

    /// Override the per-step timeout (milliseconds)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Show progress and guidance for every frame
    #[arg(long)]
    verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_logger(&args.log_level);
    if args.no_color {
        colored::control::set_override(false);
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("Config error: {}", e);
            return ExitCode::from(2);
        }
    };

    match args.frames {
        Some(ref path) if !args.interactive => run_replay(path, config, &args),
        _ => run_interactive(config, &args),
    }
}

fn load_config(args: &Args) -> livecheck::Result<LivenessConfig> {
    let mut config = match args.config {
        Some(ref path) => LivenessConfig::load(path)?,
        None => LivenessConfig::default(),
    };
    if let Some(timeout_ms) = args.timeout_ms {
        config = config.with_step_timeout_ms(timeout_ms);
        config.validate()?;
    }
    Ok(config)
}

/// Replay a recorded session; exit 0 when liveness passed
fn run_replay(path: &str, config: LivenessConfig, args: &Args) -> ExitCode {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open {}: {}", path, e);
            return ExitCode::from(2);
        }
    };

    let mut source = LineSource::json_lines(BufReader::new(file));
    let summary = match replay_source(&mut source, config, |output| print_output(output, args)) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("{}: {}", path, e);
            return ExitCode::from(2);
        }
    };

    print_summary(&summary, args);
    if summary.state.passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

/// Interactive mode: one text command per line
fn run_interactive(config: LivenessConfig, args: &Args) -> ExitCode {
    print_header(args.no_color);
    println!("Commands: face l=<p> r=<p> smile=<p> yaw=<deg> [t=<ms>] | none | error <msg> | quit");
    println!("Goal: blink, turn your head left, then smile (15s per step)");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    // The step timer starts with the first frame, on the source's clock
    let mut session: Option<LivenessSession> = None;
    let mut source = LineSource::text_commands(QuitFilter::new(stdin.lock()));
    let initial = LivenessState::default();

    loop {
        let state = session.as_ref().map_or(&initial, |session| session.state());
        print!("[{}] {} > ", state.step, state.instruction);
        let _ = stdout.flush();

        let frame = match source.next_frame() {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                warn!("{}", e);
                println!("  ⚠ {}", e);
                continue;
            }
            None => break,
        };

        let session = session.get_or_insert_with(|| LivenessSession::new(config, frame.now_ms).0);
        let output = session.ingest(&frame);
        print_output(&output, args);
        if session.passed() {
            break;
        }
    }

    let summary = SessionSummary {
        frames: session.as_ref().map_or(0, |session| session.engine().update_count()),
        state: session.map(|session| session.state().clone()).unwrap_or(initial),
        rejected: 0,
    };
    print_summary(&summary, args);
    if summary.state.passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

/// Stops reading at a `quit`/`exit` line
struct QuitFilter<R> {
    inner: R,
    done: bool,
}

impl<R> QuitFilter<R> {
    fn new(inner: R) -> Self {
        Self { inner, done: false }
    }
}

impl<R: io::BufRead> io::Read for QuitFilter<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: io::BufRead> io::BufRead for QuitFilter<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }

    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        if self.done {
            return Ok(0);
        }
        let start = buf.len();
        let n = self.inner.read_line(buf)?;
        let line = buf[start..].trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            self.done = true;
            buf.truncate(start);
            return Ok(0);
        }
        Ok(n)
    }
}

fn print_header(no_color: bool) {
    let title = format!("livecheck v{} - Interactive", VERSION);
    if no_color {
        println!("========================================");
        println!("  {}", title);
        println!("========================================");
    } else {
        println!("{}", "════════════════════════════════════════".bold());
        println!("  {}", title.bold());
        println!("{}", "════════════════════════════════════════".bold());
    }
    println!();
}

fn print_output(output: &StepOutput, args: &Args) {
    if args.json {
        match serde_json::to_string(output) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("cannot serialize output: {}", e),
        }
        return;
    }

    if args.no_color {
        println!("{}", output.to_parseable_string());
    } else {
        println!("{}", output.to_terminal_string());
    }

    if args.verbose {
        let step = output.state.step;
        let filled = (step.progress_fraction() * 20.0).round() as usize;
        println!(
            "  progress [{}{}] {:.0}%",
            "#".repeat(filled),
            ".".repeat(20 - filled),
            step.progress_fraction() * 100.0
        );
        if let Some(DirectionalCue::Left) = step.cue() {
            println!("  ← turn this way");
        }
        println!("  reason: {}", output.reason);
    }
}

fn print_summary(summary: &SessionSummary, args: &Args) {
    if args.json {
        return;
    }
    let state = &summary.state;
    println!();
    if state.passed {
        let line = format!("✓ {} ({} frames)", state.instruction, summary.frames);
        if args.no_color {
            println!("{}", line);
        } else {
            println!("{}", line.green().bold());
        }
    } else {
        let line = format!(
            "✗ Liveness not passed - stopped at {} ({} frames)",
            state.step, summary.frames
        );
        if args.no_color {
            println!("{}", line);
        } else {
            println!("{}", line.red());
        }
    }
}
