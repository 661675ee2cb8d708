use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use seolens_core::{ImageRef, SignalSet};
use std::sync::OnceLock;

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

struct Selectors {
    title: Selector,
    meta_description: Selector,
    h1: Selector,
    h2: Selector,
    img: Selector,
    body: Selector,
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| Selectors {
        title: Selector::parse("title").expect("valid title selector"),
        meta_description: Selector::parse(r#"meta[name="description"]"#)
            .expect("valid meta selector"),
        h1: Selector::parse("h1").expect("valid h1 selector"),
        h2: Selector::parse("h2").expect("valid h2 selector"),
        img: Selector::parse("img").expect("valid img selector"),
        body: Selector::parse("body").expect("valid body selector"),
    })
}

/// Extract the SEO signal set from a fetched document.
///
/// Never fails: input that is not markup (for example a JSON payload from the
/// search fallback) yields an empty signal set carrying `http_status`.
pub fn extract(html: &str, http_status: u16) -> SignalSet {
    if !looks_like_markup(html) {
        tracing::debug!("Input is not markup, returning empty signal set");
        return SignalSet::empty(http_status);
    }

    let document = Html::parse_document(html);
    let sel = selectors();

    let title = first_text(&document, &sel.title);
    let meta_description = document
        .select(&sel.meta_description)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|content| content.trim().to_string());
    let h1 = first_text(&document, &sel.h1);
    let h2s = document.select(&sel.h2).map(|el| element_text(&el)).collect();

    let images = document
        .select(&sel.img)
        .map(|el| ImageRef {
            src: el.value().attr("src").unwrap_or_default().to_string(),
            alt: el.value().attr("alt").map(str::to_string),
        })
        .collect();

    let word_count = document
        .select(&sel.body)
        .next()
        .map_or(0, |body| count_words(&visible_text(&body)));

    SignalSet {
        title,
        meta_description,
        h1,
        h2s,
        images,
        word_count,
        http_status,
    }
}

/// Count whitespace-delimited tokens.
///
/// Whitespace runs collapse to single spaces, the result is trimmed and split,
/// and empty tokens are dropped.
pub fn count_words(text: &str) -> usize {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));

    let normalized = whitespace.replace_all(text, " ");
    normalized
        .trim()
        .split(' ')
        .filter(|token| !token.is_empty())
        .count()
}

fn looks_like_markup(input: &str) -> bool {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.contains('<') {
        return false;
    }
    serde_json::from_str::<serde_json::Value>(trimmed).is_err()
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).next().map(|el| element_text(&el))
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Concatenated text of `root`, skipping script-like subtrees.
fn visible_text(root: &ElementRef) -> String {
    let mut text = String::new();
    for node in root.descendants() {
        let Node::Text(chunk) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            text.push_str(chunk);
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <!DOCTYPE html>
        <html>
        <head>
            <title>  Handmade Ceramic Mugs | Studio Kiln  </title>
            <meta name="description" content="  Small-batch mugs thrown by hand.  ">
            <style>body { color: red; }</style>
        </head>
        <body>
            <h1> Our Mugs </h1>
            <h2>Glazes</h2>
            <p>Every mug is   thrown
               and glazed in our studio.</p>
            <h2>Care</h2>
            <img src="/a.jpg" alt="Blue mug">
            <img src="/b.jpg">
            <img alt="">
            <script>var hidden = "these words do not count";</script>
        </body>
        </html>
    "#;

    #[test]
    fn test_extract_signals() {
        let signals = extract(PAGE, 200);

        assert_eq!(
            signals.title.as_deref(),
            Some("Handmade Ceramic Mugs | Studio Kiln")
        );
        assert_eq!(
            signals.meta_description.as_deref(),
            Some("Small-batch mugs thrown by hand.")
        );
        assert_eq!(signals.h1.as_deref(), Some("Our Mugs"));
        assert_eq!(signals.h2s, vec!["Glazes", "Care"]);
        assert_eq!(signals.images.len(), 3);
        assert_eq!(signals.images[0].alt.as_deref(), Some("Blue mug"));
        assert_eq!(signals.images[1].alt, None);
        assert_eq!(signals.images[2].src, "");
        assert_eq!(signals.images_without_alt(), 2);
        assert_eq!(signals.http_status, 200);
        // "Our Mugs" + "Glazes" + "Every mug is thrown and glazed in our studio." + "Care"
        assert_eq!(signals.word_count, 2 + 1 + 9 + 1);
    }

    #[test]
    fn test_absent_versus_empty() {
        let signals = extract("<html><head><title></title></head><body><p>x</p></body></html>", 200);
        assert_eq!(signals.title.as_deref(), Some(""));
        assert_eq!(signals.meta_description, None);
        assert_eq!(signals.h1, None);
    }

    #[test]
    fn test_non_markup_degrades_to_empty() {
        let payload = r#"{"organic_results":[{"title":"<b>Example</b>","snippet":"words here"}]}"#;
        assert_eq!(extract(payload, 200), SignalSet::empty(200));
        assert_eq!(extract("", 200), SignalSet::empty(200));
        assert_eq!(extract("plain words without tags", 201), SignalSet::empty(201));
    }

    #[test]
    fn test_malformed_markup_does_not_fail() {
        let signals = extract("<html><body><h1>Unclosed <p>some text", 200);
        assert_eq!(signals.h1.as_deref(), Some("Unclosed some text"));
        assert_eq!(signals.word_count, 3);
    }

    #[test]
    fn test_extract_is_idempotent() {
        assert_eq!(extract(PAGE, 200), extract(PAGE, 200));
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   \n\t "), 0);
        assert_eq!(count_words("one"), 1);
        assert_eq!(count_words("  one\ttwo\n\nthree  "), 3);
        assert_eq!(count_words("non\u{a0}breaking space"), 3);
    }
}
