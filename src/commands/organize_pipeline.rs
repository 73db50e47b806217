//! Interactive session: propose, review, apply, and offer an immediate undo.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Result;

use crate::commands::model_commands::{format_change, request_plan};
use crate::commands::{organize_commands, undo_commands, CommandCtx};
use crate::models::plan::{Approvals, ProposedChange};

/// Asks a yes/no question. Blank input or end of input picks `default`.
fn ask(
    question: &str,
    default: bool,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<bool> {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    loop {
        write!(output, "{question} {hint} ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(default);
        }
        match line.trim().to_lowercase().as_str() {
            "" => return Ok(default),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(output, "Please answer y or n.")?,
        }
    }
}

fn review_plan(
    plan: &[ProposedChange],
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<Approvals> {
    let mut approvals = Approvals::all();
    for (index, change) in plan.iter().enumerate() {
        writeln!(output, "{}", format_change(index, change))?;
        let approved = ask("  Apply this change?", true, input, output)?;
        approvals.set(index, approved);
    }
    Ok(approvals)
}

pub async fn run(ctx: &CommandCtx, dir: &Path, yes: bool) -> Result<()> {
    let Some((base, plan)) = request_plan(ctx, dir).await? else {
        return Ok(());
    };
    if plan.is_empty() {
        println!("The model proposed no changes.");
        return Ok(());
    }

    let approvals = if yes {
        for (index, change) in plan.iter().enumerate() {
            println!("{}", format_change(index, change));
        }
        Approvals::all()
    } else {
        let stdin = io::stdin();
        review_plan(&plan, &mut stdin.lock(), &mut io::stdout())?
    };
    let approved = approvals.approved_count(plan.len());
    if approved == 0 {
        println!("No changes approved.");
        return Ok(());
    }

    let outcome = organize_commands::apply_and_record(ctx, plan, approvals, base, None).await?;
    if yes || outcome.batch.is_empty() {
        return Ok(());
    }

    let undo_now = {
        let stdin = io::stdin();
        ask(
            "Undo these changes now?",
            false,
            &mut stdin.lock(),
            &mut io::stdout(),
        )?
    };
    if undo_now {
        undo_commands::undo(ctx, None).await?;
    }
    Ok(())
}
