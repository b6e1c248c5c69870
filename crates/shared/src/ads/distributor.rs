//! Inline ad distribution
//!
//! Splices ad snippets into rendered article content. Requested word offsets
//! are only a hint: ads are spread out so they never cluster, capped by the
//! length of the content, and nudged forward onto sentence or block
//! boundaries so a snippet does not land in the middle of markup.

use serde::Serialize;

use super::directive::AdDirective;
use crate::markup::escape_html;
use crate::types::PlacementKind;

/// Minimum spacing between two ads, in words
const MIN_GAP_WORDS: usize = 80;

/// Minimum spacing as a share of the content, in percent
const MIN_GAP_PERCENT: usize = 15;

/// Extra words each ad needs on top of the gap when computing the cap
const GAP_PADDING_WORDS: usize = 40;

/// Where a lone ad goes, in percent of the content
const SINGLE_AD_PERCENT: usize = 30;

/// Tokens scanned past the target looking for a boundary
const BOUNDARY_LOOKAHEAD: usize = 12;

/// Sentence and block endings; line breaks are picked up by `scan_tags`
const BOUNDARY_MARKERS: &[&str] = &[".", "!", "?", "</p>", "</div>"];

/// One ad spliced into the content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub id: String,
    /// Position in the final ordering
    pub index: usize,
    /// Word count the ad was aimed at
    pub target: usize,
    /// Token index the wrapper was spliced in at
    pub token_index: usize,
}

/// Content with its ads spliced in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementPlan {
    pub html: String,
    pub placements: Vec<Placement>,
}

/// Splice `directives` into `content` and return the resulting HTML
pub fn distribute_inline_ads(content: &str, directives: &[AdDirective]) -> String {
    plan_inline_ads(content, directives).html
}

/// Compute the full placement plan for `directives` over `content`
pub fn plan_inline_ads(content: &str, directives: &[AdDirective]) -> PlacementPlan {
    let (html, placed) = place_inline_ads(content, directives);
    PlacementPlan {
        html,
        placements: placed.into_iter().map(|(placement, _)| placement).collect(),
    }
}

/// Splice the ads in, pairing every placement with the directive it came from
pub(crate) fn place_inline_ads<'a>(
    content: &str,
    directives: &'a [AdDirective],
) -> (String, Vec<(Placement, &'a AdDirective)>) {
    if directives.is_empty() {
        return (content.to_string(), Vec::new());
    }

    let mut candidates: Vec<&AdDirective> = directives
        .iter()
        .filter(|d| d.position_offset > 0)
        .collect();
    candidates.sort_by_key(|d| d.position_offset);

    let total_words = tokenize(content).iter().filter(|t| is_word(t)).count();
    let min_gap = MIN_GAP_WORDS.max(total_words * MIN_GAP_PERCENT / 100);
    let max_ads = (total_words / (min_gap + GAP_PADDING_WORDS)).max(1);
    candidates.truncate(max_ads);

    let targets = resolve_targets(&candidates, total_words, min_gap);

    let mut html = content.to_string();
    let mut placements = Vec::with_capacity(candidates.len());

    for (index, (&directive, target)) in candidates.iter().zip(targets).enumerate() {
        let tokens = tokenize(&html);
        let at = insertion_index(&tokens, target);
        let wrapper = render_wrapper(directive, index);

        let mut next = String::with_capacity(html.len() + wrapper.len() + 2);
        tokens[..at].iter().for_each(|t| next.push_str(t));
        next.push('\n');
        next.push_str(&wrapper);
        next.push('\n');
        tokens[at..].iter().for_each(|t| next.push_str(t));

        tracing::trace!(ad_id = %directive.id, index, target, token_index = at, "Placed inline ad");

        let placement = Placement {
            id: directive.id.clone(),
            index,
            target,
            token_index: at,
        };
        placements.push((placement, directive));
        html = next;
    }

    (html, placements)
}

/// Word count each surviving directive is aimed at
fn resolve_targets(candidates: &[&AdDirective], total_words: usize, min_gap: usize) -> Vec<usize> {
    let n = candidates.len();
    if n == 1 {
        return vec![total_words * SINGLE_AD_PERCENT / 100];
    }

    let ideal_gap = total_words / (n + 1);
    let total = total_words as i64;
    let gap = min_gap as i64;

    candidates
        .iter()
        .enumerate()
        .map(|(i, directive)| {
            let base = (i + 1) * ideal_gap;
            let lower = i as i64 * gap;
            let upper = total - (n - i - 1) as i64 * gap;
            let requested = directive.position_offset;

            if requested >= lower && requested <= upper {
                requested as usize
            } else {
                base
            }
        })
        .collect()
}

/// Token index to splice the next wrapper in at
fn insertion_index(tokens: &[&str], target: usize) -> usize {
    let tags = scan_tags(tokens);

    let counted = if target == 0 {
        None
    } else {
        let mut words = 0;
        tokens.iter().position(|t| {
            if is_word(t) {
                words += 1;
            }
            words >= target
        })
    };

    let index = match counted {
        Some(pos) => snap_to_boundary(tokens, &tags, pos)
            .unwrap_or_else(|| direct_insertion(&tags, pos)),
        None => 0,
    };

    if index == 0 {
        tokens.len() / 2
    } else {
        index
    }
}

/// First boundary at or within the lookahead window after `pos`
fn snap_to_boundary(tokens: &[&str], tags: &[TokenTags], pos: usize) -> Option<usize> {
    lookahead(tokens.len(), pos)
        .find(|&j| {
            !tags[j].open_after
                && (tags[j].closes_break || BOUNDARY_MARKERS.iter().any(|m| tokens[j].contains(m)))
        })
        .map(|j| j + 1)
}

/// Right after the counted token, or after the tag it opens if that tag
/// closes within the lookahead window
fn direct_insertion(tags: &[TokenTags], pos: usize) -> usize {
    lookahead(tags.len(), pos)
        .find(|&j| !tags[j].open_after)
        .map_or(pos + 1, |j| j + 1)
}

fn lookahead(len: usize, pos: usize) -> std::ops::RangeInclusive<usize> {
    pos..=(pos + BOUNDARY_LOOKAHEAD).min(len.saturating_sub(1))
}

/// Markup state at the end of a token
#[derive(Debug, Clone, Copy, Default)]
struct TokenTags {
    /// A tag opened in this or an earlier token is still unclosed
    open_after: bool,
    /// The token closes a `<br>` tag, in any of its spellings
    closes_break: bool,
}

/// Track tags across tokens. A `<` only opens a tag when a name, `/` or `!`
/// follows it, so plain-text comparisons like `3 < 5` leave the state alone.
fn scan_tags(tokens: &[&str]) -> Vec<TokenTags> {
    let mut open = false;
    let mut in_break = false;

    tokens
        .iter()
        .map(|token| {
            let mut closes_break = false;
            for (i, ch) in token.char_indices() {
                let rest = &token[i + ch.len_utf8()..];
                match ch {
                    '<' if opens_tag(rest) => {
                        open = true;
                        in_break = is_break_tag(rest);
                    }
                    '>' if open => {
                        open = false;
                        closes_break |= in_break;
                        in_break = false;
                    }
                    _ => {}
                }
            }
            TokenTags {
                open_after: open,
                closes_break,
            }
        })
        .collect()
}

fn opens_tag(rest: &str) -> bool {
    rest.chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
}

fn is_break_tag(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    bytes.len() >= 2
        && bytes[..2].eq_ignore_ascii_case(b"br")
        && bytes.get(2).map_or(true, |c| !c.is_ascii_alphanumeric())
}

/// Split on whitespace, keeping the whitespace runs so joining the tokens
/// reproduces the input exactly
fn tokenize(content: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut prev_ws: Option<bool> = None;

    for (idx, ch) in content.char_indices() {
        let ws = ch.is_whitespace();
        if prev_ws.is_some_and(|prev| prev != ws) {
            tokens.push(&content[start..idx]);
            start = idx;
        }
        prev_ws = Some(ws);
    }
    if start < content.len() {
        tokens.push(&content[start..]);
    }

    tokens
}

fn is_word(token: &str) -> bool {
    token.chars().any(|c| !c.is_whitespace())
}

fn render_wrapper(directive: &AdDirective, index: usize) -> String {
    format!(
        r#"<div class="inline-ad" data-ad-id="{}" data-ad-placement="{}" data-ad-index="{}" data-ad-appearance="{}">{}</div>"#,
        escape_html(&directive.id),
        PlacementKind::Inline,
        index,
        escape_html(&directive.appearance),
        directive.code_snippet,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    fn word_count(s: &str) -> usize {
        tokenize(s).iter().filter(|t| is_word(t)).count()
    }

    #[test]
    fn test_tokenize_round_trips() {
        let content = "  <p>Hello,\tworld.</p>\n\n<p>Next  one</p> ";
        let tokens = tokenize(content);
        assert_eq!(tokens.concat(), content);
        assert_eq!(tokens.iter().filter(|t| is_word(t)).count(), 4);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_empty_directives_is_identity() {
        let content = "<p>Some article text.</p>";
        assert_eq!(distribute_inline_ads(content, &[]), content);
    }

    #[test]
    fn test_non_positive_offsets_are_skipped() {
        let content = words(300);
        let directives = vec![
            AdDirective::new("neg", "<ins>neg</ins>", -5),
            AdDirective::new("zero", "<ins>zero</ins>", 0),
        ];

        let plan = plan_inline_ads(&content, &directives);
        assert!(plan.placements.is_empty());
        assert_eq!(plan.html, content);
    }

    #[test]
    fn test_single_ad_goes_thirty_percent_in() {
        let content = words(200);
        let plan = plan_inline_ads(&content, &[AdDirective::new("solo", "<ins></ins>", 190)]);

        assert_eq!(plan.placements.len(), 1);
        assert_eq!(plan.placements[0].target, 60);

        let (before, _) = plan.html.split_once("<div class=\"inline-ad\"").unwrap();
        assert_eq!(word_count(before), 60);
    }

    #[test]
    fn test_snaps_to_sentence_boundary() {
        let mut parts = vec!["word"; 200];
        parts[62] = "end.";
        let content = parts.join(" ");

        let plan = plan_inline_ads(&content, &[AdDirective::new("solo", "<ins></ins>", 5)]);
        let (before, _) = plan.html.split_once("<div class=\"inline-ad\"").unwrap();

        assert!(before.trim_end().ends_with("end."));
        assert_eq!(word_count(before), 63);
    }

    #[test]
    fn test_falls_back_to_direct_insertion_without_boundary() {
        let mut parts = vec!["word"; 200];
        // Boundary just outside the lookahead window
        parts[67] = "late.";
        let content = parts.join(" ");

        let plan = plan_inline_ads(&content, &[AdDirective::new("solo", "<ins></ins>", 5)]);
        let (before, _) = plan.html.split_once("<div class=\"inline-ad\"").unwrap();
        assert_eq!(word_count(before), 60);
    }

    #[test]
    fn test_boundary_inside_tag_is_ignored() {
        let mut parts = vec!["word"; 200];
        parts[60] = "<a";
        parts[61] = "href=\"https://example.com/x\">link</a>";
        let content = parts.join(" ");

        let plan = plan_inline_ads(&content, &[AdDirective::new("solo", "<ins></ins>", 5)]);
        let (before, _) = plan.html.split_once("<div class=\"inline-ad\"").unwrap();

        // The href token closes the tag and contains a '.', so it is a safe boundary
        assert!(before.trim_end().ends_with("link</a>"));
    }

    #[test]
    fn test_direct_insertion_never_splits_a_tag() {
        let mut parts = vec!["word"; 200];
        parts[59] = "<img";
        parts[60] = "alt=x";
        parts[61] = "src=y>";
        let content = parts.join(" ");

        let plan = plan_inline_ads(&content, &[AdDirective::new("solo", "<ins></ins>", 5)]);
        let (before, _) = plan.html.split_once("<div class=\"inline-ad\"").unwrap();
        assert!(before.trim_end().ends_with("src=y>"));
    }

    #[test]
    fn test_stray_angle_bracket_in_text_is_not_a_tag() {
        let mut parts: Vec<String> = (1..=300).map(|i| format!("w{}.", i)).collect();
        parts[9] = "<".to_string();
        let content = parts.join(" ");

        let plan = plan_inline_ads(&content, &[AdDirective::new("solo", "<ins></ins>", 5)]);
        let (before, _) = plan.html.split_once("<div class=\"inline-ad\"").unwrap();

        assert_eq!(plan.placements[0].target, 90);
        assert_eq!(word_count(before), 90);
        assert!(before.trim_end().ends_with("w90."));
    }

    #[test]
    fn test_comparison_operators_do_not_block_boundaries() {
        let mut parts = vec!["word"; 200];
        parts[20] = "3<5";
        parts[40] = "<=";
        parts[62] = "done.";
        let content = parts.join(" ");

        let plan = plan_inline_ads(&content, &[AdDirective::new("solo", "<ins></ins>", 5)]);
        let (before, _) = plan.html.split_once("<div class=\"inline-ad\"").unwrap();
        assert!(before.trim_end().ends_with("done."));
    }

    #[test]
    fn test_unclosed_tag_beyond_lookahead_inserts_after_target() {
        let mut parts = vec!["word"; 200];
        parts[59] = "<span";
        // Closing '>' is far outside the lookahead window
        parts[90] = "x>";
        let content = parts.join(" ");

        let plan = plan_inline_ads(&content, &[AdDirective::new("solo", "<ins></ins>", 5)]);
        let (before, _) = plan.html.split_once("<div class=\"inline-ad\"").unwrap();

        assert_eq!(word_count(before), 60);
        assert!(before.trim_end().ends_with("<span"));
    }

    #[test]
    fn test_spaced_line_break_is_a_boundary() {
        let mut parts = vec!["word"; 200];
        parts[61] = "end<br />";
        let content = parts.join(" ");

        let plan = plan_inline_ads(&content, &[AdDirective::new("solo", "<ins></ins>", 5)]);
        let (before, _) = plan.html.split_once("<div class=\"inline-ad\"").unwrap();
        assert!(before.trim_end().ends_with("end<br />"));
    }

    #[test]
    fn test_line_break_spellings() {
        let tokens = ["a<br>", " ", "b<BR/>", " ", "c<br", " ", "/>", " ", "<brand>"];
        let tags = scan_tags(&tokens);

        assert!(tags[0].closes_break);
        assert!(tags[2].closes_break);
        assert!(tags[4].open_after && !tags[4].closes_break);
        assert!(tags[6].closes_break && !tags[6].open_after);
        assert!(!tags[8].closes_break);
    }

    #[test]
    fn test_short_content_caps_to_one_ad() {
        let content = words(50);
        let directives = vec![
            AdDirective::new("a", "<ins>a</ins>", 10),
            AdDirective::new("b", "<ins>b</ins>", 20),
            AdDirective::new("c", "<ins>c</ins>", 30),
        ];

        let plan = plan_inline_ads(&content, &directives);
        assert_eq!(plan.placements.len(), 1);
        assert_eq!(plan.placements[0].id, "a");
        assert_eq!(plan.html.matches("data-ad-placement=\"INLINE\"").count(), 1);
    }

    #[test]
    fn test_out_of_band_offsets_use_even_spacing() {
        let content = words(1000);
        // Both requests crowd the start; the second falls below its band
        let directives = vec![
            AdDirective::new("a", "<ins></ins>", 10),
            AdDirective::new("b", "<ins></ins>", 20),
        ];

        let plan = plan_inline_ads(&content, &directives);
        let targets: Vec<usize> = plan.placements.iter().map(|p| p.target).collect();
        // min gap 150, ideal gap 333: "a" is inside [0, 850], "b" is outside [150, 1000]
        assert_eq!(targets, vec![10, 666]);
    }

    #[test]
    fn test_degenerate_content_falls_back_to_midpoint() {
        let plan = plan_inline_ads("tiny", &[AdDirective::new("a", "<ins></ins>", 3)]);
        assert_eq!(plan.placements[0].target, 0);
        assert_eq!(plan.placements[0].token_index, 0);
        assert!(plan.html.contains("data-ad-id=\"a\""));
        assert!(plan.html.ends_with("tiny"));

        let empty = distribute_inline_ads("", &[AdDirective::new("a", "<ins></ins>", 3)]);
        assert!(empty.contains("data-ad-id=\"a\""));
    }

    #[test]
    fn test_wrapper_escapes_attributes() {
        let directive = AdDirective::new("x\"><script>", "<ins></ins>", 1).with_appearance("wide");
        let html = render_wrapper(&directive, 2);

        assert!(html.contains("data-ad-id=\"x&quot;&gt;&lt;script&gt;\""));
        assert!(html.contains("data-ad-index=\"2\""));
        assert!(html.contains("data-ad-appearance=\"wide\""));
        assert!(html.ends_with("<ins></ins></div>"));
    }
}
