use crate::cli::Context;
use crate::error::Result;
use crate::settings::{SettingsStore, GROUP_NAME, USER_NAME};

pub fn run(ctx: &mut Context, name: Option<&str>, group: Option<&str>) -> Result<()> {
    if let Some(name) = name {
        ctx.settings.set(USER_NAME, name.trim())?;
    }
    if let Some(group) = group {
        ctx.settings.set(GROUP_NAME, group.trim())?;
    }

    let settings = ctx.settings.settings();
    let or_unset = |v: &str| if v.is_empty() { "(not set)".to_string() } else { v.to_string() };
    println!("Name:   {}", or_unset(&settings.user_name));
    println!("Group:  {}", or_unset(&settings.group_label()));
    Ok(())
}
