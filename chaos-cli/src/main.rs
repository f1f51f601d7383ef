use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use chaos_core::flags::{FLAGS, PRESETS};
use chaos_core::{run, RandomiserSettings};

#[derive(Debug, Parser)]
#[command(name = "chaos-randomiser", version, about = "Seeded ROM randomiser")]
struct Args {
    #[arg(long, required_unless_present = "list_flags")]
    input: Option<PathBuf>,

    #[arg(long, required_unless_present = "list_flags")]
    output: Option<PathBuf>,

    #[arg(long, required_unless_present = "list_flags")]
    seed: Option<u64>,

    /// Whitespace-separated flag names, e.g. "c dialogue".
    #[arg(long, default_value = "")]
    flags: String,

    #[arg(long)]
    preset: Option<String>,

    /// Dialogue patch file, or a directory searched for *.txt files.
    #[arg(long = "dialogue-patches", value_name = "PATH")]
    dialogue_patches: Vec<PathBuf>,

    /// Byte substitution listing (ORG / hex lines).
    #[arg(long = "substitutions", value_name = "PATH")]
    substitutions: Vec<PathBuf>,

    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Print the known flags and presets and exit.
    #[arg(long)]
    list_flags: bool,
}

fn init_tracing(debug: bool) {
    let default = if debug { "chaos_core=debug" } else { "chaos_core=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn print_flags() {
    println!("Flags:");
    for flag in FLAGS {
        println!("  {:<14} [{}] {}", flag.name, flag.category, flag.description);
    }
    println!("Presets:");
    for preset in PRESETS {
        println!("  {:<14} \"{}\" {}", preset.name, preset.flags, preset.description);
    }
}

fn main() {
    let args = Args::parse();
    init_tracing(args.debug);

    if args.list_flags {
        print_flags();
        return;
    }

    // clap guarantees these are present once --list-flags is ruled out.
    let (Some(seed), Some(input_path), Some(output_path)) = (args.seed, args.input, args.output)
    else {
        eprintln!("Error: --input, --output and --seed are required");
        std::process::exit(2);
    };

    let settings = RandomiserSettings {
        seed,
        flags: args.flags,
        preset: args.preset,
        dialogue_patch_paths: args.dialogue_patches,
        substitution_paths: args.substitutions,
        debug: args.debug,
        input_path,
        output_path,
    };

    match run(settings) {
        Ok(summary) => {
            println!(
                "Wrote seed {} [{}]: {} substitutions, {} bytes",
                summary.seed, summary.flags, summary.substitutions, summary.bytes_written
            );
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
