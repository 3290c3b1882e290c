//! Thin CLI collaborator exercising the `disasm_analyzer` library through
//! its public query surface (spec.md §6 names the surface; formatting and
//! dispatch are this binary's concern, not the core's).

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use disasm_analyzer::{Analyzer, Arch, FunctionGraph};

#[derive(Parser)]
#[command(name = "disasm-analyzer", about = "Summarize calls, syscalls, and mnemonics in a disassembly listing")]
struct Cli {
    /// Target architecture: mips, x86_64, arm, aarch64, or s390x. Unknown
    /// tags fall back to mips with a warning.
    #[arg(long)]
    arch: String,

    /// Path to a disassembly listing, or `-` to read standard input.
    #[arg(long)]
    input: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every function with its callees and resolved syscalls.
    DumpGraph,
    /// List every identified function, one per line.
    ListFunctions,
    /// List the callees of one function.
    ListCallees {
        function: String,
        #[arg(long)]
        transitive: bool,
    },
    /// List the resolved syscall values of one function.
    ListSyscalls {
        function: String,
        #[arg(long)]
        transitive: bool,
    },
    /// List the instruction mnemonics of one function.
    ListInstructions {
        function: String,
        #[arg(long)]
        transitive: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let arch = Arch::parse(&cli.arch);

    let analyzer = if cli.input.as_os_str() == "-" {
        Analyzer::from_reader(io::stdin().lock(), arch)
    } else {
        Analyzer::from_path(&cli.input, arch)
    };

    let analyzer = match analyzer {
        Ok(analyzer) => analyzer,
        Err(err) => {
            eprintln!("disasm-analyzer: {err}");
            return ExitCode::FAILURE;
        }
    };

    run(&cli.command, analyzer.graph());
    ExitCode::SUCCESS
}

fn run(command: &Command, graph: &FunctionGraph) {
    match command {
        Command::DumpGraph => dump_graph(graph),
        Command::ListFunctions => {
            for name in graph.functions() {
                println!("{name}");
            }
        }
        Command::ListCallees { function, transitive } => {
            let callees = if *transitive {
                graph.transitive_callees(function)
            } else {
                graph.direct_callees(function)
            };
            println!("{}", callees.join(" "));
        }
        Command::ListSyscalls { function, transitive } => {
            let syscalls = if *transitive {
                graph.transitive_syscalls(function)
            } else {
                graph.direct_syscalls(function)
            };
            println!("{}", syscalls.join(" "));
        }
        Command::ListInstructions { function, transitive } => {
            let mnemonics = if *transitive {
                graph.transitive_mnemonics(function)
            } else {
                graph.direct_mnemonics(function)
            };
            println!("{}", mnemonics.join(" "));
        }
    }
}

fn dump_graph(graph: &FunctionGraph) {
    for name in graph.functions() {
        let syscalls = graph.direct_syscalls(&name);
        let callees = graph.direct_callees(&name);

        let prefix = if syscalls.is_empty() {
            name.clone()
        } else {
            format!("{name} [syscall: {}]", syscalls.join(","))
        };

        if callees.is_empty() {
            println!("{prefix} (no calls)");
        } else {
            println!("{prefix} -> {}", callees.join(", "));
        }
    }
}
