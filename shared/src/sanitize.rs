/// Strips HTML markup from `text`, keeping only its text content.
///
/// Tags, comments and declarations are dropped, a trailing unterminated tag is
/// dropped, and a `<` that does not open a tag (`a < b`) is kept as text.
/// Entities such as `&amp;` are left encoded.
/// Passes repeat until nothing changes, so stripping can never leave behind a
/// tag assembled from the pieces around one it removed (`<<b>b>`).
pub fn strip_html(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let mut current = text.to_string();
    loop {
        let stripped = strip_markup(&current);
        if stripped == current {
            return stripped;
        }
        current = stripped;
    }
}

fn opens_tag(candidate: &str) -> bool {
    matches!(
        candidate[1..].chars().next(),
        Some(c) if c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?')
    )
}

fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];

        rest = if let Some(comment) = candidate.strip_prefix("<!--") {
            comment.find("-->").map_or("", |end| &comment[end + 3..])
        } else if opens_tag(candidate) {
            candidate.find('>').map_or("", |end| &candidate[end + 1..])
        } else {
            out.push('<');
            &candidate[1..]
        };
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("<b>Fix sink</b>", "Fix sink")]
    #[case("plain text", "plain text")]
    #[case("<p class=\"x\">Hello <i>there</i></p>", "Hello there")]
    #[case("a < b and c > d", "a < b and c > d")]
    #[case("before<!-- hidden <b>bold</b> -->after", "beforeafter")]
    #[case("<br/>line<br />", "line")]
    #[case("dangling <a href=", "dangling ")]
    #[case("<<b>b>", "")]
    #[case("caf\u{e9} <em>cr\u{e8}me</em>", "caf\u{e9} cr\u{e8}me")]
    #[case("Tom &amp; Jerry", "Tom &amp; Jerry")]
    #[case("", "")]
    fn strips_markup(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_html(Some(input)), expected);
    }

    #[test]
    fn none_becomes_empty() {
        assert_eq!(strip_html(None), "");
    }

    #[rstest]
    #[case("<b>Fix sink</b>")]
    #[case("<<b>b>x")]
    #[case("<<<i>i>i>nested")]
    #[case("x <!-- a --> <script>alert(1)</script> y")]
    #[case("a < b")]
    #[case("&lt;b&gt; entities stay")]
    fn stripping_is_idempotent(#[case] input: &str) {
        let once = strip_html(Some(input));
        assert_eq!(strip_html(Some(&once)), once);
    }
}
