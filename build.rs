use anyhow::Result;
use vergen::EmitBuilder;

// Embeds the short git revision and dirty flag for the CLI `--version` output.
// Outside a git checkout vergen emits placeholder values instead of failing.
fn main() -> Result<()> {
    EmitBuilder::builder().git_sha(true).git_dirty(false).emit()?;
    Ok(())
}
