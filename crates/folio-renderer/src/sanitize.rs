//! Allow-list sanitizer for rich-text markup.
//!
//! Text blocks carry editor-authored HTML. Before display the markup is
//! rewritten so that only a fixed set of formatting tags survives, with a
//! fixed set of attributes per tag. URLs are limited to `http`, `https`,
//! `mailto` and relative references. The contents of `script`, `style`,
//! `iframe` and similar elements are dropped entirely; any other unknown tag
//! is removed while its text is kept.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<(/?)([a-zA-Z][a-zA-Z0-9]*)((?:\s[^<>]*)?)>").unwrap());

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .unwrap()
});

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{1,31});").unwrap());

/// Elements whose content is removed along with the tags.
const DROP_CONTENT: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template", "svg", "math",
];

/// Elements that never have a closing tag.
const VOID: &[&str] = &["br", "hr", "img"];

/// Permitted elements and their permitted attributes.
const ALLOWED: &[(&str, &[&str])] = &[
    ("a", &["href", "title", "target"]),
    ("b", &[]),
    ("blockquote", &[]),
    ("br", &[]),
    ("code", &[]),
    ("del", &[]),
    ("em", &[]),
    ("h2", &[]),
    ("h3", &[]),
    ("h4", &[]),
    ("hr", &[]),
    ("i", &[]),
    ("img", &["src", "alt", "title"]),
    ("li", &[]),
    ("mark", &[]),
    ("ol", &[]),
    ("p", &[]),
    ("pre", &[]),
    ("s", &[]),
    ("span", &[]),
    ("strong", &[]),
    ("sub", &[]),
    ("sup", &[]),
    ("u", &[]),
    ("ul", &[]),
];

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Return `url` if its scheme is safe to link to.
///
/// Relative references and `http`, `https` and `mailto` URLs pass. Anything
/// with another scheme, or with characters that could hide one (control
/// characters, character references), is rejected.
pub fn safe_url(url: &str) -> Option<&str> {
    let trimmed = url.trim();
    if trimmed.chars().any(char::is_control) {
        return None;
    }
    let lowered = trimmed.to_ascii_lowercase();
    if lowered.contains("&#") || lowered.contains("&colon") {
        return None;
    }

    let scheme_end = lowered.find(':');
    let path_start = lowered.find(['/', '?', '#']);
    match scheme_end {
        Some(colon) if path_start.is_none_or(|p| colon < p) => {
            let scheme = &lowered[..colon];
            matches!(scheme, "http" | "https" | "mailto").then_some(trimmed)
        }
        _ => Some(trimmed),
    }
}

/// Rewrite editor markup to the permitted subset.
///
/// The result is always well-formed: stray closing tags are dropped and
/// unclosed elements are closed at the end.
pub fn sanitize_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut open: Vec<&'static str> = Vec::new();
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        match c {
            '<' => rest = consume_markup(rest, &mut out, &mut open),
            '&' => {
                if let Some(m) = ENTITY_RE.find(rest) {
                    out.push_str(m.as_str());
                    rest = &rest[m.end()..];
                } else {
                    out.push_str("&amp;");
                    rest = &rest[1..];
                }
            }
            '>' => {
                out.push_str("&gt;");
                rest = &rest[1..];
            }
            '"' => {
                out.push_str("&quot;");
                rest = &rest[1..];
            }
            _ => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    while let Some(tag) = open.pop() {
        write!(out, "</{tag}>").unwrap();
    }
    out
}

/// Handle markup starting at `<`. Returns the remaining input.
fn consume_markup<'a>(rest: &'a str, out: &mut String, open: &mut Vec<&'static str>) -> &'a str {
    if let Some(body) = rest.strip_prefix("<!--") {
        return body.find("-->").map_or("", |end| &body[end + 3..]);
    }

    let Some(caps) = TAG_RE.captures(rest) else {
        out.push_str("&lt;");
        return &rest[1..];
    };
    let whole = caps.get(0).map_or(1, |m| m.end());
    let closing = !caps[1].is_empty();
    let name = caps[2].to_ascii_lowercase();
    let attrs = caps.get(3).map_or("", |m| m.as_str());
    let after = &rest[whole..];

    if DROP_CONTENT.contains(&name.as_str()) {
        if closing {
            return after;
        }
        return skip_element(after, &name);
    }

    let Some((tag, permitted)) = ALLOWED
        .iter()
        .find(|(allowed, _)| *allowed == name)
        .map(|(allowed, attrs)| (*allowed, *attrs))
    else {
        return after;
    };

    if closing {
        if let Some(pos) = open.iter().rposition(|t| *t == tag) {
            for t in open.drain(pos..).rev() {
                write!(out, "</{t}>").unwrap();
            }
        }
        return after;
    }

    out.push('<');
    out.push_str(tag);
    write_attributes(tag, permitted, attrs, out);
    out.push('>');
    if !VOID.contains(&tag) {
        open.push(tag);
    }
    after
}

/// Skip past the closing tag of `name`, or to the end of input.
fn skip_element<'a>(rest: &'a str, name: &str) -> &'a str {
    let lowered = rest.to_ascii_lowercase();
    let needle = format!("</{name}");
    match lowered.find(&needle) {
        Some(start) => {
            let tail = &rest[start..];
            tail.find('>').map_or("", |end| &tail[end + 1..])
        }
        None => "",
    }
}

fn write_attributes(tag: &str, permitted: &[&str], attrs: &str, out: &mut String) {
    let mut new_window = false;

    for caps in ATTR_RE.captures_iter(attrs) {
        let name = caps[1].to_ascii_lowercase();
        if !permitted.contains(&name.as_str()) {
            continue;
        }
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());

        let value = match name.as_str() {
            "href" | "src" => match safe_url(value) {
                Some(url) => url,
                None => continue,
            },
            "target" => {
                if value != "_blank" {
                    continue;
                }
                new_window = true;
                value
            }
            _ => value,
        };
        write!(out, r#" {name}="{}""#, escape_html(value)).unwrap();
    }

    if new_window && tag == "a" {
        out.push_str(r#" rel="noopener noreferrer""#);
    }
}

/// Reduce sanitized markup to plain text.
///
/// Tags are removed, block-level boundaries become line breaks, and the
/// common character references are decoded.
pub fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('>') else {
            rest = "";
            break;
        };
        let tag = rest[start + 1..start + end].trim_start_matches('/').to_ascii_lowercase();
        if matches!(tag.split_whitespace().next(), Some("p" | "br" | "li" | "blockquote" | "pre"))
            && !text.ends_with('\n')
            && !text.is_empty()
        {
            text.push('\n');
        }
        rest = &rest[start + end + 1..];
    }
    text.push_str(rest);

    decode_entities(text.trim())
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_keeps_formatting() {
        assert_eq!(
            sanitize_html("<p>Hello <strong>world</strong> &amp; <em>you</em></p>"),
            "<p>Hello <strong>world</strong> &amp; <em>you</em></p>"
        );
    }

    #[test]
    fn test_drops_script_with_content() {
        assert_eq!(
            sanitize_html("<p>Hi</p><script>alert('x')</script><p>there</p>"),
            "<p>Hi</p><p>there</p>"
        );
        assert_eq!(sanitize_html("<SCRIPT src=x>evil()</SCRIPT >ok"), "ok");
        assert_eq!(sanitize_html("before<style>body{}"), "before");
    }

    #[test]
    fn test_strips_event_handlers_and_styles() {
        assert_eq!(
            sanitize_html(r#"<p onclick="steal()" style="color:red">x</p>"#),
            "<p>x</p>"
        );
    }

    #[test]
    fn test_removes_unsafe_href() {
        assert_eq!(
            sanitize_html(r#"<a href="javascript:alert(1)">click</a>"#),
            "<a>click</a>"
        );
        assert_eq!(
            sanitize_html(r#"<a href=" JaVaScRiPt:alert(1)">x</a>"#),
            "<a>x</a>"
        );
        assert_eq!(
            sanitize_html(r#"<a href="javascript&#58;alert(1)">x</a>"#),
            "<a>x</a>"
        );
    }

    #[test]
    fn test_keeps_safe_href_and_marks_new_window() {
        assert_eq!(
            sanitize_html(r#"<a href="https://example.com/?a=1&b=2" target="_blank">x</a>"#),
            r#"<a href="https://example.com/?a=1&amp;b=2" target="_blank" rel="noopener noreferrer">x</a>"#
        );
        assert_eq!(
            sanitize_html(r#"<a href='/about'>About</a>"#),
            r#"<a href="/about">About</a>"#
        );
    }

    #[test]
    fn test_unknown_tags_removed_text_kept() {
        assert_eq!(
            sanitize_html("<div><font color=red>plain</font></div>"),
            "plain"
        );
    }

    #[test]
    fn test_balances_tags() {
        assert_eq!(sanitize_html("<p><strong>open"), "<p><strong>open</strong></p>");
        assert_eq!(sanitize_html("text</em>"), "text");
        assert_eq!(
            sanitize_html("<ul><li>one<li>two</ul>"),
            "<ul><li>one<li>two</li></li></ul>"
        );
    }

    #[test]
    fn test_escapes_stray_brackets() {
        assert_eq!(sanitize_html("1 < 2 > 0"), "1 &lt; 2 &gt; 0");
        assert_eq!(sanitize_html("<<script>x</script>"), "&lt;");
    }

    #[test]
    fn test_drops_comments() {
        assert_eq!(sanitize_html("a<!-- <script> -->b"), "ab");
        assert_eq!(sanitize_html("a<!-- unterminated"), "a");
    }

    #[test]
    fn test_img_attributes() {
        assert_eq!(
            sanitize_html(r#"<img src="data:image/png;base64,AAA" alt="x" onerror="y">"#),
            r#"<img alt="x">"#
        );
        assert_eq!(
            sanitize_html(r#"<img src="/a.png" alt="A">"#),
            r#"<img src="/a.png" alt="A">"#
        );
    }

    #[test]
    fn test_safe_url() {
        assert_eq!(safe_url("https://example.com"), Some("https://example.com"));
        assert_eq!(safe_url("mailto:hi@example.com"), Some("mailto:hi@example.com"));
        assert_eq!(safe_url("/contact"), Some("/contact"));
        assert_eq!(safe_url("#top"), Some("#top"));
        assert_eq!(safe_url("page?next=http://x"), Some("page?next=http://x"));
        assert_eq!(safe_url("javascript:void(0)"), None);
        assert_eq!(safe_url("java\tscript:x"), None);
        assert_eq!(safe_url("vbscript:x"), None);
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(
            strip_tags("<p>Fish &amp; chips</p><p>Second <em>line</em></p>"),
            "Fish & chips\nSecond line"
        );
    }
}
