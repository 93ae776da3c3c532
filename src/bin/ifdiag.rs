use anyhow::Result;
use ifdiag::cli::run;

fn main() -> Result<()> {
    run()
}
