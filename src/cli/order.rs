//! Load-order commands - list, add, remove, move

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use modstack::error::{Error, Result};
use modstack::registry::AddOutcome;
use modstack::types::{Mod, ModId};

/// Print the load order, lowest precedence first
pub fn run_list(ctx: &CommandContext) {
    if ctx.registry.is_empty() {
        println!("{}", "No mods registered".muted());
        println!(
            "{}",
            format!("Stage mods under {}", ctx.config.mods_dir.display()).muted()
        );
        return;
    }

    println!("{}:", "Load order (last wins)".emphasis());
    for (index, m) in ctx.registry.as_slice().iter().enumerate() {
        println!(
            "  {:>3}  {}  {}",
            index,
            m.id.accent(),
            m.source_folder.display().muted()
        );
    }
}

/// Register an already-staged mod at the end of the load order
pub fn run_add(ctx: &mut CommandContext, id: &str) -> Result<()> {
    let m = Mod::in_storage(&ctx.config.mods_dir, id);
    if !m.exists_on_disk() {
        return Err(Error::ModNotFound(format!(
            "{id} (no folder at {})",
            m.source_folder.display()
        )));
    }

    match ctx.registry.add(m) {
        AddOutcome::Added => {
            ctx.save()?;
            println!(
                "{} Added {} at position {}",
                check(),
                id.accent(),
                ctx.registry.len() - 1
            );
        }
        AddOutcome::Duplicate(existing) => {
            println!(
                "{}",
                format!(
                    "{} is already registered ({}); re-stage it instead",
                    existing.id,
                    existing.source_folder.display()
                )
                .warn()
            );
        }
    }
    Ok(())
}

/// Drop a mod from the load order (its files stay in storage)
pub fn run_remove(ctx: &mut CommandContext, id: &str) -> Result<()> {
    let removed = ctx.registry.remove(&ModId::from(id))?;
    ctx.save()?;
    println!("{} Removed {}", check(), removed.id.accent());
    Ok(())
}

/// Move a mod to a new position
pub fn run_move(ctx: &mut CommandContext, id: &str, index: usize) -> Result<()> {
    let id = ModId::from(id);
    ctx.registry.move_to(&id, index)?;
    ctx.save()?;

    let position = ctx
        .registry
        .ids()
        .iter()
        .position(|i| i == &id)
        .unwrap_or(index);
    println!("{} Moved {} to position {}", check(), id.accent(), position);
    Ok(())
}
