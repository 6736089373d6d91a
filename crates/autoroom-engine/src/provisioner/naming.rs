//! Room name templating.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?:user|count|game)\}").unwrap());

/// Separators that a removed placeholder may absorb.
const BLANK: &[char] = &[' ', '\t'];

/// Values available to a name template.
#[derive(Debug, Clone)]
pub struct NameContext<'a> {
    /// Owner's display name, for `{user}`.
    pub user: &'a str,
    /// 1 + rooms the owner already has in this tenant, for `{count}`.
    pub count: usize,
    /// Owner's foreground activity, for `{game}`. `None` removes the placeholder.
    pub game: Option<&'a str>,
}

/// Render `template`, then truncate to `max_len` characters (at least one).
///
/// Unrecognised `{...}` sequences are kept literally and substituted values
/// are never expanded again. A removed `{game}` takes the template spaces
/// around it along, leaving at most one. An empty result falls back to the
/// user's display name.
pub fn render_name(template: &str, ctx: &NameContext<'_>, max_len: usize) -> String {
    let pieces = split(template, ctx);
    let mut out = String::with_capacity(template.len());

    for (i, piece) in pieces.iter().enumerate() {
        let prev = i.checked_sub(1).and_then(|j| pieces.get(j));
        let next = pieces.get(i + 1);
        match piece {
            Piece::Text(text) => {
                let mut text = *text;
                if matches!(prev, Some(Piece::Removed)) {
                    text = text.trim_start_matches(BLANK);
                }
                if matches!(next, Some(Piece::Removed)) {
                    text = text.trim_end_matches(BLANK);
                }
                out.push_str(text);
            }
            Piece::Value(value) => out.push_str(value),
            Piece::Removed => {
                let spaced = matches!(prev, Some(Piece::Text(t)) if t.ends_with(BLANK))
                    || matches!(next, Some(Piece::Text(t)) if t.starts_with(BLANK));
                if spaced && !out.ends_with(' ') {
                    out.push(' ');
                }
            }
        }
    }

    let rendered = out.trim();
    let name = if rendered.is_empty() {
        ctx.user.trim()
    } else {
        rendered
    };
    truncate_chars(name, max_len.max(1))
}

enum Piece<'a> {
    /// Template text between placeholders.
    Text(&'a str),
    Value(Cow<'a, str>),
    /// `{game}` with no activity.
    Removed,
}

/// Alternating text and placeholder pieces, starting and ending with text.
fn split<'a>(template: &'a str, ctx: &NameContext<'a>) -> Vec<Piece<'a>> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for m in PLACEHOLDER_RE.find_iter(template) {
        pieces.push(Piece::Text(&template[last..m.start()]));
        pieces.push(match m.as_str() {
            "{user}" => Piece::Value(Cow::Borrowed(ctx.user)),
            "{count}" => Piece::Value(Cow::Owned(ctx.count.to_string())),
            _ => ctx
                .game
                .map_or(Piece::Removed, |game| Piece::Value(Cow::Borrowed(game))),
        });
        last = m.end();
    }
    pieces.push(Piece::Text(&template[last..]));
    pieces
}

fn truncate_chars(name: &str, max_len: usize) -> String {
    match name.char_indices().nth(max_len) {
        Some((cut, _)) => name[..cut].trim_end().to_string(),
        None => name.to_string(),
    }
}
