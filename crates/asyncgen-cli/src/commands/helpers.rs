//! `asyncgen helpers` command implementation.

use asyncgen_core::{helpers, HelperUsage};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

#[derive(Serialize)]
struct HelpersJson {
    ok: bool,
    used: HelperUsage,
    code: String,
}

/// Selected helpers, or all of them when nothing is selected.
fn selection(async_fn: bool, async_gen: bool, async_iterator: bool) -> HelperUsage {
    let used = HelperUsage {
        async_fn,
        async_generator: async_gen,
        for_await: async_iterator,
    };
    if used.any() {
        used
    } else {
        HelperUsage::ALL
    }
}

pub fn run(async_fn: bool, async_gen: bool, async_iterator: bool, json: bool) -> Result<()> {
    let used = selection(async_fn, async_gen, async_iterator);
    let code = helpers::render(used).trim_start_matches('\n').to_string();

    if json {
        let out = HelpersJson { ok: true, used, code };
        println!("{}", serde_json::to_string_pretty(&out).into_diagnostic()?);
    } else {
        println!("{code}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_defaults_to_all() {
        assert_eq!(selection(false, false, false), HelperUsage::ALL);
        let only_iterator = selection(false, false, true);
        assert!(only_iterator.for_await);
        assert!(!only_iterator.async_fn);
    }
}
