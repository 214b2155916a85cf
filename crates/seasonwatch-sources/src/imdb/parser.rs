use regex::Regex;
use seasonwatch_models::EpisodeInfo;
use tracing::debug;

const EPISODE_CARD_CLASS: &str = "episode-item-wrapper";
const TITLE_CLASS: &str = "ipc-title__text";
const RELEASE_DATE_CLASS: &str = "knzESm";
const TEXT_BUTTON_CLASS: &str = "ipc-text-button";
const PLOT_CLASS: &str = "ipc-html-content-inner-div";
const ADD_PLOT_PROMPT: &str = "Add a plot";

/// Extracts the first episode card of an IMDb season page
///
/// Works on the raw markup: finds the first `<article>` tagged as an episode
/// card, then reads title, release date and plot state from elements inside it.
pub struct EpisodePageParser {
    open_tag: Regex,
    class_attr: Regex,
    any_tag: Regex,
    numeric_entity: Regex,
}

/// Inner markup of an element located inside a fragment
struct Element<'a> {
    inner: &'a str,
}

impl EpisodePageParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            open_tag: Regex::new(r"(?is)<([a-z][a-z0-9]*)\b([^>]*)>")?,
            class_attr: Regex::new(r#"(?i)\bclass\s*=\s*"([^"]*)""#)?,
            any_tag: Regex::new(r"(?s)<[^>]*>")?,
            numeric_entity: Regex::new(r"&#([xX]?)([0-9a-fA-F]+);")?,
        })
    }

    /// Parse a season page. A page without an episode card yields an empty
    /// [`EpisodeInfo`], which the classifier treats as not announced.
    pub fn parse(&self, html: &str) -> EpisodeInfo {
        let Some(card) = self.first_element_with_class(html, Some("article"), EPISODE_CARD_CLASS) else {
            debug!("No episode card found on season page");
            return EpisodeInfo::default();
        };
        let card = card.inner;

        let title = self
            .first_element_with_class(card, None, TITLE_CLASS)
            .map(|el| self.text_of(el.inner))
            .unwrap_or_default();

        let release_date = self
            .first_element_with_class(card, Some("span"), RELEASE_DATE_CLASS)
            .map(|el| self.text_of(el.inner))
            .unwrap_or_default();

        let has_add_plot_button = self
            .elements_with_class(card, Some("a"), TEXT_BUTTON_CLASS)
            .iter()
            .any(|el| self.text_of(el.inner).contains(ADD_PLOT_PROMPT));

        let plot = self
            .first_element_with_class(card, None, PLOT_CLASS)
            .map(|el| self.text_of(el.inner))
            .unwrap_or_default();

        EpisodeInfo {
            title,
            release_date,
            has_plot: !has_add_plot_button && !plot.is_empty(),
        }
    }

    fn first_element_with_class<'a>(&self, html: &'a str, tag: Option<&str>, class: &str) -> Option<Element<'a>> {
        self.matching_elements(html, tag, class).next()
    }

    fn elements_with_class<'a>(&self, html: &'a str, tag: Option<&str>, class: &str) -> Vec<Element<'a>> {
        self.matching_elements(html, tag, class).collect()
    }

    fn matching_elements<'a, 'b>(
        &'b self,
        html: &'a str,
        tag: Option<&'b str>,
        class: &'b str,
    ) -> impl Iterator<Item = Element<'a>> + 'b
    where
        'a: 'b,
    {
        self.open_tag.captures_iter(html).filter_map(move |caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            if let Some(wanted) = tag {
                if !name.eq_ignore_ascii_case(wanted) {
                    return None;
                }
            }
            let attrs = caps.get(2)?.as_str();
            if !self.has_class(attrs, class) {
                return None;
            }

            let rest = &html[whole.end()..];
            Some(Element { inner: &rest[..matching_close(rest, &name)] })
        })
    }

    fn has_class(&self, attrs: &str, class: &str) -> bool {
        self.class_attr
            .captures(attrs)
            .and_then(|caps| caps.get(1))
            .map(|list| list.as_str().split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Visible text of a fragment: tags stripped, entities decoded, whitespace collapsed
    fn text_of(&self, fragment: &str) -> String {
        let stripped = self.any_tag.replace_all(fragment, " ");
        let decoded = self.decode_entities(&stripped);
        decoded.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn decode_entities(&self, text: &str) -> String {
        let named = text
            .replace("&nbsp;", " ")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&lt;", "<")
            .replace("&gt;", ">");

        let numeric = self.numeric_entity.replace_all(&named, |caps: &regex::Captures| {
            let radix = if caps[1].is_empty() { 10 } else { 16 };
            u32::from_str_radix(&caps[2], radix)
                .ok()
                .and_then(char::from_u32)
                .map(|c| c.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        });

        // Last so that "&amp;lt;" stays a literal "&lt;"
        numeric.replace("&amp;", "&")
    }
}

/// Offset of the close tag that balances an already opened `name` element.
/// Same-name elements nested inside are counted; an unclosed element runs to the end.
fn matching_close(rest: &str, name: &str) -> usize {
    let bytes = rest.as_bytes();
    let name = name.as_bytes();
    let mut depth = 1usize;
    let mut pos = 0;

    while let Some(offset) = rest[pos..].find('<') {
        let at = pos + offset;
        let after = &bytes[at + 1..];
        let (closing, tail) = match after.first() {
            Some(b'/') => (true, &after[1..]),
            _ => (false, after),
        };

        if starts_with_tag(tail, name) {
            if closing {
                depth -= 1;
                if depth == 0 {
                    return at;
                }
            } else if !self_closing(&rest[at..]) {
                depth += 1;
            }
        }
        pos = at + 1;
    }
    rest.len()
}

fn starts_with_tag(tail: &[u8], name: &[u8]) -> bool {
    tail.len() >= name.len()
        && tail[..name.len()].eq_ignore_ascii_case(name)
        && tail
            .get(name.len())
            .map_or(true, |b| !b.is_ascii_alphanumeric() && *b != b'-')
}

fn self_closing(tag: &str) -> bool {
    tag.find('>')
        .map_or(false, |end| tag[..end].trim_end().ends_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn season_page(card: &str) -> String {
        format!(
            r#"<html><body><section class="sc-episodes">{}<article class="sc-other episode-item-wrapper">
            <div class="ipc-title__text">S1.E2 ∙ Second</div></article></section></body></html>"#,
            card
        )
    }

    fn announced_card() -> &'static str {
        r#"<article class="sc-1 episode-item-wrapper">
            <h4 data-testid="slate-list-card-title"><a href="/title/tt1/"><div class="ipc-title__text">S3.E1 &#8729; The Long Night &amp; After</div></a></h4>
            <span class="sc-ccd6e31b-10 knzESm">Fri, Mar 7, 2025</span>
            <div class="ipc-html-content ipc-html-content--base"><div class="ipc-html-content-inner-div" role="presentation">The survivors regroup.</div></div>
        </article>"#
    }

    fn placeholder_card() -> &'static str {
        r#"<article class="episode-item-wrapper">
            <h4 data-testid="slate-list-card-title"><div class="ipc-title__text">S3.E1 ∙ Episode #3.1</div></h4>
            <span class="knzESm">2026</span>
            <a class="ipc-link ipc-text-button" href="/plot">Add a plot</a>
        </article>"#
    }

    #[test]
    fn test_parse_announced_card() {
        let parser = EpisodePageParser::new().unwrap();
        let info = parser.parse(&season_page(announced_card()));

        assert_eq!(info.title, "S3.E1 ∙ The Long Night & After");
        assert_eq!(info.release_date, "Fri, Mar 7, 2025");
        assert!(info.has_plot);
    }

    #[test]
    fn test_parse_placeholder_card() {
        let parser = EpisodePageParser::new().unwrap();
        let info = parser.parse(&season_page(placeholder_card()));

        assert_eq!(info.title, "S3.E1 ∙ Episode #3.1");
        assert_eq!(info.release_date, "2026");
        assert!(!info.has_plot);
    }

    #[test]
    fn test_add_plot_prompt_overrides_plot_text() {
        let parser = EpisodePageParser::new().unwrap();
        let html = r#"<article class="episode-item-wrapper">
            <div class="ipc-title__text">Pilot</div>
            <div class="ipc-html-content-inner-div">Some teaser</div>
            <a class="ipc-text-button"><span>Add a plot</span></a>
        </article>"#;

        let info = parser.parse(html);
        assert_eq!(info.title, "Pilot");
        assert_eq!(info.release_date, "");
        assert!(!info.has_plot);
    }

    #[test]
    fn test_page_without_episode_card() {
        let parser = EpisodePageParser::new().unwrap();
        let info = parser.parse("<html><body><article class=\"review\">Nothing</article></body></html>");
        assert_eq!(info, EpisodeInfo::default());
    }

    #[test]
    fn test_class_must_match_whole_token() {
        let parser = EpisodePageParser::new().unwrap();
        let html = r#"<article class="episode-item-wrapper-list"><div class="ipc-title__text">Nope</div></article>"#;
        assert!(parser.parse(html).title.is_empty());
    }

    #[test]
    fn test_nested_same_tag_keeps_trailing_plot_text() {
        let parser = EpisodePageParser::new().unwrap();
        let html = r#"<article class="episode-item-wrapper">
            <div class="ipc-title__text">S2.E1 ∙ Homecoming</div>
            <div class="ipc-html-content-inner-div"><div class="spoiler-note"></div>They finally return home.</div>
        </article>"#;

        let info = parser.parse(html);
        assert_eq!(info.title, "S2.E1 ∙ Homecoming");
        assert!(info.has_plot);
    }

    #[test]
    fn test_card_with_nested_article_is_read_whole() {
        let parser = EpisodePageParser::new().unwrap();
        let html = r#"<article class="episode-item-wrapper">
            <article class="promo"><span>Watch now</span></article>
            <div class="ipc-title__text">S4.E1 ∙ Aftermath</div>
            <span class="knzESm">Mon, Jan 5, 2026</span>
        </article>"#;

        let info = parser.parse(html);
        assert_eq!(info.title, "S4.E1 ∙ Aftermath");
        assert_eq!(info.release_date, "Mon, Jan 5, 2026");
    }

    #[test]
    fn test_matching_close_counts_depth() {
        let rest = "a<div>b<br/><div/>c</div>d</DIV>e";
        assert_eq!(&rest[..matching_close(rest, "div")], "a<div>b<br/><div/>c</div>d");
        assert_eq!(matching_close("no close", "div"), "no close".len());
        assert_eq!(matching_close("<divider></divider></div>", "div"), 19);
    }

    #[test]
    fn test_decode_entities() {
        let parser = EpisodePageParser::new().unwrap();
        assert_eq!(parser.text_of("Tom &amp; Jerry&#39;s &#x41;&nbsp;day"), "Tom & Jerry's A day");
        assert_eq!(parser.text_of("&amp;lt;b&amp;gt;"), "&lt;b&gt;");
    }
}
