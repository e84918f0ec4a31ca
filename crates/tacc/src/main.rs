//! The compiler driver. Takes a TAC text file and prints either the
//! re-serialised TAC or the generated RISC-V 32 assembly.
//!
//! Run with `--help` for more info.

use std::process;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(version, about = "TAC to RISC-V 32-bit compiler", long_about = None)]
struct Args {
    /// the input TAC file
    #[arg(long)]
    input: String,
    /// output the parsed TAC
    #[arg(long)]
    tac: bool,
    /// output generated RISC-V assembly (the default)
    #[arg(long)]
    riscv: bool,
}

fn main() {
    let args = Args::parse();

    let source = std::fs::read_to_string(&args.input).unwrap_or_else(|err| {
        eprintln!("{}: {}", args.input, err);
        process::exit(1);
    });

    let prog = match tac_ir::parse_program(&source) {
        Ok(prog) => prog,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };

    // --riscv wins when both modes are given; it is also the default.
    if args.tac && !args.riscv {
        println!("{}", prog);
    } else {
        print!("{}", tac_target_riscv32::compile_program(&prog));
    }
}
