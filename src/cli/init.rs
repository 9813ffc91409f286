use crate::cli::Context;
use crate::error::Result;
use crate::settings::{shellexpand_path, SettingsStore, DATA_DIR};

pub fn run(ctx: &mut Context) -> Result<()> {
    if ctx.data_dir_override {
        let resolved = shellexpand_path(&ctx.data_dir.to_string_lossy());
        ctx.settings.set(DATA_DIR, &resolved)?;
        ctx.data_dir = resolved.into();
    } else {
        ctx.settings.save()?;
    }

    ctx.open_db()?;
    println!("Initialized sift at {}", ctx.data_dir.display());
    Ok(())
}
