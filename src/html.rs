//! Element names a mono selector may start with.
//!
//! Based on the MDN element index, including web-component and obsolete elements so
//! legacy stylesheets still compile.

pub const HTML_ELEMENTS: &[&str] = &[
    // main root
    "html",
    // document metadata
    "base", "head", "link", "meta", "style", "title",
    // sectioning root
    "body",
    // content sectioning
    "address", "article", "aside", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hgroup", "main", "nav", "search", "section",
    // text content
    "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure", "hr", "li", "menu", "ol",
    "p", "pre", "ul",
    // inline text semantics
    "a", "abbr", "b", "bdi", "bdo", "br", "cite", "code", "data", "dfn", "em", "i", "kbd",
    "mark", "q", "rp", "rt", "rtc", "ruby", "s", "samp", "small", "span", "strong", "sub",
    "sup", "time", "u", "var", "wbr",
    // image and multimedia
    "area", "audio", "img", "map", "track", "video",
    // embedded content
    "embed", "fencedframe", "iframe", "object", "param", "picture", "portal", "source",
    // svg and mathml
    "svg", "math",
    // scripting
    "canvas", "noscript", "script",
    // demarcating edits
    "del", "ins",
    // table content
    "caption", "col", "colgroup", "table", "tbody", "td", "tfoot", "th", "thead", "tr",
    // forms
    "button", "datalist", "fieldset", "form", "input", "label", "legend", "meter", "optgroup",
    "option", "output", "progress", "select", "textarea",
    // interactive elements
    "details", "dialog", "menuitem", "summary",
    // web components
    "slot", "template",
    // obsolete and deprecated
    "acronym", "applet", "basefont", "bgsound", "big", "blink", "center", "command", "content",
    "dir", "element", "font", "frame", "frameset", "image", "isindex", "keygen", "listing",
    "marquee", "multicol", "nextid", "nobr", "noembed", "noframes", "plaintext", "shadow",
    "spacer", "strike", "tt", "xmp",
];

/// Membership test. Type selectors match element names ASCII case-insensitively.
pub fn is_html_element(name: &str) -> bool {
    HTML_ELEMENTS
        .iter()
        .any(|element| element.eq_ignore_ascii_case(name))
}
