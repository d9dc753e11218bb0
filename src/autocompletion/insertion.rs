use crate::{
    autocompletion::{
        candidate::Autocompletion,
        position::{char_at, clamp_offset, clamp_span, node_start_before},
    },
    expression::ExpressionAndCaret,
};
use log::debug;
use ropey::Rope;

const TO_STRING_OPEN: &str = "ToString(";
const TO_STRING_CLOSE: &str = ")";

/// Separator appended after a completion, in priority order.
fn suffix(autocompletion: &Autocompletion) -> &'static str {
    if autocompletion.add_dot {
        "."
    } else if autocompletion.add_parameter_separator {
        ", "
    } else if autocompletion.add_namespace_separator {
        "::"
    } else if autocompletion.add_parenthesis {
        "()"
    } else {
        ""
    }
}

/// Completion text followed by its suffix, unless the text right after the
/// replacement already starts with it.
fn format_completion(autocompletion: &Autocompletion, next_char: Option<char>) -> String {
    let suffix = suffix(autocompletion);
    let already_present = match (next_char, suffix.chars().next()) {
        (Some(next), Some(first)) => next == first,
        _ => false,
    };
    if already_present {
        autocompletion.completion.clone()
    } else {
        format!("{}{suffix}", autocompletion.completion)
    }
}

// Leaves the caret between the parentheses so arguments can be typed.
fn parenthesis_adjustment(autocompletion: &Autocompletion) -> usize {
    usize::from(autocompletion.add_parenthesis && autocompletion.has_visible_parameters)
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Apply a chosen autocompletion to an expression, returning the new text and
/// caret. All positions are char offsets.
pub fn insert_autocompletion(
    expression_and_caret: ExpressionAndCaret,
    autocompletion: &Autocompletion,
) -> ExpressionAndCaret {
    if autocompletion.is_exact {
        return expression_and_caret;
    }
    if autocompletion.is_full_expression() {
        let caret_location = char_len(&autocompletion.completion);
        return ExpressionAndCaret::new(autocompletion.completion.clone(), caret_location);
    }

    let mut rope = Rope::from_str(&expression_and_caret.expression);
    let caret = clamp_offset(expression_and_caret.caret_location, &rope);
    let adjustment = parenthesis_adjustment(autocompletion);
    let should_convert = autocompletion.should_convert_to_string();

    if rope.len_chars() == 0 || caret == 0 {
        let inserted = format_completion(autocompletion, None);
        let inserted_len = char_len(&inserted);
        rope.insert(0, &inserted);
        let mut caret_location = inserted_len;
        if should_convert {
            rope.insert(0, TO_STRING_OPEN);
            rope.insert(rope.len_chars(), TO_STRING_CLOSE);
            caret_location += char_len(TO_STRING_OPEN);
        }
        return ExpressionAndCaret::new(
            rope.to_string(),
            caret_location.saturating_sub(adjustment),
        );
    }

    let (start, end) = clamp_span(
        autocompletion.replacement_start_position,
        autocompletion.replacement_end_position,
        rope.len_chars(),
    );
    let inserted = format_completion(autocompletion, char_at(&rope, end));
    let inserted_len = char_len(&inserted);

    rope.remove(start..end);
    rope.insert(start, &inserted);
    let mut caret_location = start + inserted_len;

    if should_convert {
        let node_start = match autocompletion.node_start_position {
            Some(node_start) => node_start.min(start),
            None => node_start_before(&rope, start),
        };
        rope.insert(caret_location, TO_STRING_CLOSE);
        rope.insert(node_start, TO_STRING_OPEN);
        caret_location += char_len(TO_STRING_OPEN);
    }

    let caret_location = caret_location.saturating_sub(adjustment);
    debug!(
        "inserted {:?} at {start}..{end}, caret now {caret_location}",
        autocompletion.completion
    );
    ExpressionAndCaret::new(rope.to_string(), caret_location)
}
