use std::collections::{HashMap, HashSet};

use ammonia::Builder;

/// Cleans rendered HTML against the set of tags and attributes the renderer
/// itself can produce. Anything else, such as raw `<script>` markup passed
/// through inline, is dropped.
pub fn sanitize_html(html: &str) -> String {
    let tags: HashSet<&'static str> = [
        "a",
        "blockquote",
        "br",
        "code",
        "del",
        "em",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "hr",
        "img",
        "input",
        "li",
        "ol",
        "p",
        "pre",
        "strong",
        "table",
        "tbody",
        "td",
        "th",
        "thead",
        "tr",
        "ul",
    ]
    .iter()
    .copied()
    .collect();

    let mut tag_attributes: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();
    tag_attributes.insert("a", ["href", "title"].iter().copied().collect());
    tag_attributes.insert("img", ["alt", "src", "title"].iter().copied().collect());
    tag_attributes.insert(
        "input",
        ["type", "checked", "disabled"].iter().copied().collect(),
    );
    tag_attributes.insert("li", ["class"].iter().copied().collect());
    tag_attributes.insert("code", ["class"].iter().copied().collect());
    tag_attributes.insert("th", ["style"].iter().copied().collect());
    tag_attributes.insert("td", ["style"].iter().copied().collect());

    Builder::new()
        .tags(tags)
        .generic_attributes(HashSet::new())
        .tag_attributes(tag_attributes)
        .clean(html)
        .to_string()
}
