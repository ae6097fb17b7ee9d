//! `quill tags` command implementation.

use quill_posts::TagCounts;

use super::Context;
use crate::error::CliError;

/// Execute the tags command.
pub(crate) fn execute(ctx: &Context) -> Result<(), CliError> {
    let counts = ctx.manager.tags()?;
    if counts.is_empty() {
        ctx.output.info("No tags");
        return Ok(());
    }

    let width = counts.keys().map(String::len).max().unwrap_or(0);
    for (tag, count) in by_count(&counts) {
        ctx.output.line(&format!("{tag:<width$}  {count}"));
    }
    Ok(())
}

/// Tags ordered by descending count, then by name.
fn by_count(counts: &TagCounts) -> Vec<(&str, usize)> {
    let mut sorted: Vec<_> = counts.iter().map(|(t, c)| (t.as_str(), *c)).collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    sorted
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_by_count_orders_by_count_then_name() {
        let counts: TagCounts = [
            ("rust".to_owned(), 2),
            ("go".to_owned(), 5),
            ("c".to_owned(), 2),
        ]
        .into();

        assert_eq!(by_count(&counts), vec![("go", 5), ("c", 2), ("rust", 2)]);
    }
}
