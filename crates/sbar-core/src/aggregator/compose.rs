use sbar_model::{BarLayout, STYLE_TERMINATOR};

const ELLIPSIS: &str = "...";

/// Join slot outputs into one display string.
///
/// Rules, in slot order:
/// - non-empty outputs are shortened to the layout budget and wrapped in the delimiters;
/// - wrapped outputs are separated by a single space;
/// - the split marker follows the slot at `split_after`, even when that slot is empty;
/// - an empty result becomes the layout placeholder.
///
/// Pure function of its inputs: equal slots always give equal output.
pub fn compose(slots: &[String], layout: &BarLayout) -> String {
    let mut bar = String::new();

    for (i, output) in slots.iter().enumerate() {
        if !output.is_empty() {
            bar.push_str(&layout.left);
            push_shortened(&mut bar, output, layout.budget);
            bar.push_str(&layout.right);
            bar.push(' ');
        }
        if layout.split_after == Some(i) {
            bar.push_str(&layout.split_marker);
        }
    }

    if bar.ends_with(' ') {
        bar.pop();
    }
    if bar.is_empty() {
        return layout.placeholder.clone();
    }
    bar
}

/// Push `output` cut to `budget` characters, keeping a trailing style terminator.
fn push_shortened(bar: &mut String, output: &str, budget: usize) {
    let Some((cut, _)) = output.char_indices().nth(budget) else {
        bar.push_str(output);
        return;
    };

    bar.push_str(&output[..cut]);
    bar.push_str(ELLIPSIS);
    if output.ends_with(STYLE_TERMINATOR) {
        bar.push_str(STYLE_TERMINATOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn wraps_and_joins_non_empty_outputs() {
        let layout = BarLayout::default();
        let out = compose(&slots(&["12:00", "", "load 0.1"]), &layout);
        assert_eq!(out, "[12:00] [load 0.1]");
    }

    #[test]
    fn custom_delimiters() {
        let layout = BarLayout::default().with_markers("<", ">");
        assert_eq!(compose(&slots(&["a", "b"]), &layout), "<a> <b>");
    }

    #[test]
    fn empty_board_shows_placeholder() {
        let layout = BarLayout::default();
        assert_eq!(compose(&[], &layout), "No output");
        assert_eq!(compose(&slots(&["", ""]), &layout), "No output");
    }

    #[test]
    fn split_marker_follows_configured_slot() {
        let layout = BarLayout::default().with_split_after(1);
        assert_eq!(compose(&slots(&["a", "b", "c"]), &layout), "[a] [b] ;[c]");
    }

    #[test]
    fn split_marker_kept_after_empty_slot() {
        let layout = BarLayout::default().with_split_after(0);
        assert_eq!(compose(&slots(&["", "b"]), &layout), ";[b]");
    }

    #[test]
    fn output_is_idempotent() {
        let layout = BarLayout::default().with_split_after(0);
        let board = slots(&["x".repeat(80).as_str(), "y"]);
        assert_eq!(compose(&board, &layout), compose(&board, &layout));
    }

    #[test]
    fn long_output_is_truncated_with_ellipsis() {
        let layout = BarLayout::default();
        let long = "a".repeat(70);

        let out = compose(&[long], &layout);
        assert_eq!(out, format!("[{}...]", "a".repeat(60)));
    }

    #[test]
    fn truncation_keeps_style_terminator() {
        let layout = BarLayout::default();
        let styled = format!("^c#FF0000^{}^d^", "b".repeat(70));

        let out = compose(&[styled.clone()], &layout);
        let expected: String = styled.chars().take(60).collect();
        assert_eq!(out, format!("[{expected}...^d^]"));
    }

    #[test]
    fn output_at_budget_is_untouched() {
        let layout = BarLayout::default();
        let exact = "c".repeat(60);
        assert_eq!(compose(&[exact.clone()], &layout), format!("[{exact}]"));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let mut layout = BarLayout::default();
        layout.budget = 3;
        assert_eq!(compose(&slots(&["°C°C°C"]), &layout), "[°C°...]");
    }
}
