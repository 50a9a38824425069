use pulldown_cmark::{html, CowStr, Event, Options, Parser};

use crate::error::ContentError;
use crate::models::{PostRecord, SerializedBody};

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_MATH);
    options
}

/// Turns a post body into the form the detail page consumes.
pub fn serialize_body(record: &PostRecord) -> Result<SerializedBody, ContentError> {
    let frontmatter =
        serde_json::to_value(&record.front_matter).map_err(|e| ContentError::Serialize {
            path: record.file_path.clone(),
            message: e.to_string(),
        })?;

    Ok(SerializedBody {
        compiled_source: compile_markdown(&record.body),
        frontmatter,
    })
}

pub fn compile_markdown(markdown: &str) -> String {
    let source = rewrite_latex_delimiters(markdown);
    let events = Parser::new_ext(&source, markdown_options()).map(|event| match event {
        Event::InlineMath(math) => Event::Html(CowStr::from(math_html(&math, false))),
        Event::DisplayMath(math) => Event::Html(CowStr::from(math_html(&math, true))),
        other => other,
    });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

// pulldown-cmark only knows `$` and `$$`, so `\( \)` and `\[ \]` are
// rewritten first. Inline math spanning lines becomes display math.
fn rewrite_latex_delimiters(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(at) = rest.find('\\') {
        let tail = &rest[at..];
        let close = if tail.starts_with("\\(") {
            Some(("\\)", false))
        } else if tail.starts_with("\\[") {
            Some(("\\]", true))
        } else {
            None
        };

        let span = close.and_then(|(close, display)| {
            tail[2..].find(close).map(|len| (&tail[2..2 + len], display, 2 + len + close.len()))
        });

        match span {
            Some((math, display, consumed)) => {
                let fence = if display || math.contains('\n') { "$$" } else { "$" };
                out.push_str(&rest[..at]);
                out.push_str(fence);
                out.push_str(math);
                out.push_str(fence);
                rest = &tail[consumed..];
            }
            None => {
                out.push_str(&rest[..=at]);
                rest = &rest[at + 1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn math_html(source: &str, display_mode: bool) -> String {
    let rendered = katex::Opts::builder()
        .display_mode(display_mode)
        .build()
        .map_err(|e| e.to_string())
        .and_then(|opts| katex::render_with_opts(source, opts).map_err(|e| e.to_string()));

    match rendered {
        Ok(html) => html,
        Err(e) => {
            tracing::debug!("katex could not render {:?}: {}", source, e);
            let class = if display_mode { "math math-display" } else { "math math-inline" };
            format!("<span class=\"{class}\">{}</span>", htmlescape::encode_minimal(source))
        }
    }
}
