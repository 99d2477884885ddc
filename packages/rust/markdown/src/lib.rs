//! Post body to XHTML chapter rendering.
//!
//! Renders Reddit-flavoured Markdown with `pulldown-cmark`, wrapped in
//! cleanup passes for Reddit-specific markup, and packages the result as a
//! standalone XHTML document suitable for an EPUB container.

mod cleanup;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, TextMergeStream, html};
use tracing::{debug, instrument};

use reddit2epub_shared::{Reddit2EpubError, Result};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Options for rendering one chapter.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Chapter title, used for `<title>` and the leading `<h1>`.
    pub title: String,
    /// Href of the shared stylesheet, relative to the chapter document.
    pub stylesheet_href: String,
    /// Document language (`xml:lang`).
    pub lang: String,
}

impl RenderOptions {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            stylesheet_href: "stylesheet.css".into(),
            lang: "en".into(),
        }
    }
}

/// Result of rendering a chapter.
#[derive(Debug, Clone)]
pub struct RenderResult {
    /// Complete XHTML document.
    pub xhtml: String,
    /// Approximate word count of the body.
    pub word_count: usize,
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Render a post body into a complete XHTML chapter document.
///
/// 1. Runs the source cleanup passes (zero-width placeholders, spoilers, blank lines)
/// 2. Renders Markdown → XHTML fragment (raw HTML in the source is escaped,
///    superscript applied to text nodes)
/// 3. Wraps the fragment in an XHTML document with the title heading
#[instrument(skip(text), fields(title = %opts.title))]
pub fn render_chapter(text: &str, opts: &RenderOptions) -> Result<RenderResult> {
    if text.trim().is_empty() {
        return Err(Reddit2EpubError::Render(format!(
            "chapter '{}' has an empty body",
            opts.title
        )));
    }

    let body = render_fragment(text);
    let word_count = count_words(text);
    let xhtml = wrap_document(&body, opts);

    debug!(word_count, len = xhtml.len(), "chapter rendered");

    Ok(RenderResult { xhtml, word_count })
}

/// Render Markdown to an XHTML fragment (no surrounding document).
pub fn render_fragment(text: &str) -> String {
    let source = cleanup::run_source_pipeline(text);

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    // Code blocks and image alt text are written verbatim (escaped).
    let mut literal_depth = 0usize;
    let parser = TextMergeStream::new(Parser::new_ext(&source, options)).map(move |event| {
        match event {
            Event::Start(tag @ (Tag::CodeBlock(_) | Tag::Image { .. })) => {
                literal_depth += 1;
                Event::Start(tag)
            }
            Event::End(end @ (TagEnd::CodeBlock | TagEnd::Image)) => {
                literal_depth = literal_depth.saturating_sub(1);
                Event::End(end)
            }
            // Reddit does not allow raw HTML; treat it as text so the output
            // stays well-formed XHTML.
            Event::Text(raw) | Event::Html(raw) | Event::InlineHtml(raw) => {
                if literal_depth == 0 && raw.contains('^') {
                    Event::InlineHtml(cleanup::superscript_text(&raw).into())
                } else {
                    Event::Text(raw)
                }
            }
            other => other,
        }
    });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn wrap_document(body: &str, opts: &RenderOptions) -> String {
    let title = html_escape::encode_text(&opts.title);
    let href = html_escape::encode_double_quoted_attribute(&opts.stylesheet_href);
    let lang = html_escape::encode_double_quoted_attribute(&opts.lang);

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <!DOCTYPE html>\n\
         <html xmlns=\"http://www.w3.org/1999/xhtml\" xmlns:epub=\"http://www.idpf.org/2007/ops\" xml:lang=\"{lang}\" lang=\"{lang}\">\n\
         <head>\n\
         <meta charset=\"UTF-8\" />\n\
         <title>{title}</title>\n\
         <link rel=\"stylesheet\" type=\"text/css\" href=\"{href}\" />\n\
         </head>\n\
         <body>\n\
         <h1>{title}</h1>\n\
         {body}\
         </body>\n\
         </html>\n"
    )
}

/// Count words in Markdown, excluding fenced code blocks.
fn count_words(md: &str) -> usize {
    let mut in_code = false;
    md.lines()
        .filter(|line| {
            if line.trim_start().starts_with("```") {
                in_code = !in_code;
                return false;
            }
            !in_code
        })
        .map(|line| line.split_whitespace().count())
        .sum()
}
