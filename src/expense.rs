//! Free-form expense parsing.
//!
//! Turns chat text such as "paid 250 for lunch today" or
//! "Rahul gave 1,200 rs for cab" into an item label and a price. There is no
//! fixed grammar: the last amount in the message is the price, and the item is
//! whatever survives stopword filtering in a small token window around it.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Optional currency marker, then either comma-grouped thousands or a plain
/// decimal. The grouped form wins when both could match. Boundaries are ASCII
/// so amounts written straight after a non-Latin word ("दूध40") still match.
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?-u:\b)(?:rs|inr)?\s*",
        r"([0-9]{1,3}(?:,[0-9]{3})*(?:\.[0-9]+)?|[0-9]+(?:\.[0-9]+)?)",
        r"(?-u:\b)"
    ))
    .unwrap()
});

/// Anything that is not a letter or digit, in any script.
static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").unwrap());

/// Tokens on each side of the amount that may contribute to the item label.
const WINDOW_RADIUS: usize = 4;

/// Label used when nothing around the amount looks like an item.
pub const FALLBACK_ITEM: &str = "misc";

const STOPWORDS: &[&str] = &[
    "i", "we", "for", "on", "of", "and", "the", "to", "a", "an", "my", "our", "your", "with", "at",
    "rs", "rs.", "inr", "₹", "rupees", "paid", "pay", "spent", "buy", "bought", "purchase",
    "purchased", "gave", "give", "expense", "bill", "fees", "fare", "cost", "price", "amt",
    "amount", "is", "=", "-", "–", "—",
];

/// An expense recognized in a chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedExpense {
    /// Lowercase, never empty.
    pub item: String,
    /// Finite and strictly positive.
    pub price: f64,
}

/// Parse free text into an expense. Returns `None` for anything that does not
/// carry a positive amount, which is the common case for chat traffic.
pub fn parse_expense(raw_text: &str) -> Option<ParsedExpense> {
    let text = normalize(raw_text);
    if text.is_empty() {
        return None;
    }

    let amount = last_amount(&text)?;
    let price = amount.value()?;

    let tokens: Vec<String> = text
        .split(' ')
        .map(clean_token)
        .filter(|t| !t.is_empty())
        .collect();

    // Tokens have lost their decimal point, so a decimal amount never finds
    // its anchor and the label comes from the start of the message.
    Some(ParsedExpense {
        item: item_label(&tokens, &amount.digits.replace(',', "")),
        price,
    })
}

/// Lowercase, canonicalize currency markers to a standalone ` rs `, collapse
/// whitespace.
fn normalize(raw_text: &str) -> String {
    let text = raw_text
        .to_lowercase()
        .replace('₹', " rs ")
        .replace("rs.", " rs ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

struct AmountMatch<'a> {
    /// Digits as written, thousands separators included.
    digits: &'a str,
    negative: bool,
}

impl AmountMatch<'_> {
    fn value(&self) -> Option<f64> {
        let value: f64 = self.digits.replace(',', "").parse().ok()?;
        let value = if self.negative { -value } else { value };
        (value.is_finite() && value > 0.0).then_some(value)
    }
}

fn last_amount(text: &str) -> Option<AmountMatch<'_>> {
    let caps = AMOUNT_RE.captures_iter(text).last()?;
    let digits = caps.get(1)?;
    Some(AmountMatch {
        digits: digits.as_str(),
        negative: has_minus_sign(&text[..digits.start()]),
    })
}

/// True when `before` ends in a hyphen that stands alone as a sign, as in
/// "-50" or "rs -50" but not "tea-50".
fn has_minus_sign(before: &str) -> bool {
    let mut rev = before.chars().rev();
    match rev.next() {
        Some('-') => !rev.next().is_some_and(char::is_alphanumeric),
        _ => false,
    }
}

fn clean_token(token: &str) -> String {
    NON_WORD_RE.replace_all(token, "").into_owned()
}

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Join the non-stopword, non-numeric tokens found within `WINDOW_RADIUS` of
/// the first token that contains `anchor`. Without an anchor only the first
/// `WINDOW_RADIUS` tokens are considered.
fn item_label(tokens: &[String], anchor: &str) -> String {
    let (start, end) = match tokens.iter().position(|t| t.contains(anchor)) {
        Some(idx) => (
            idx.saturating_sub(WINDOW_RADIUS),
            (idx + WINDOW_RADIUS + 1).min(tokens.len()),
        ),
        None => (0, WINDOW_RADIUS.min(tokens.len())),
    };

    let label = tokens[start..end]
        .iter()
        .map(String::as_str)
        .filter(|t| !is_stopword(t))
        .filter(|t| !t.starts_with(|c: char| c.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join(" ");

    if label.is_empty() {
        FALLBACK_ITEM.to_string()
    } else {
        label
    }
}
