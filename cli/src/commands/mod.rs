mod completion;
mod disassemble;
mod run;

#[derive(clap::Subcommand)]
pub enum Subcommand {
    /// Load a ROM and run it
    Run(self::run::RunOpt),

    /// Print the decoded instruction listing of a ROM
    Disassemble(self::disassemble::DisassembleOpt),

    /// Generate shell completion scripts
    Completion(self::completion::CompletionOpt),
}

impl Subcommand {
    /// Run a subcommand
    pub fn exec(self) -> anyhow::Result<()> {
        match self {
            Subcommand::Run(opt) => opt.exec(),
            Subcommand::Disassemble(opt) => opt.exec(),
            Subcommand::Completion(opt) => opt.exec(),
        }
    }
}
