use htmlescape::encode_minimal;

use crate::models::{PostSummary, RenderedPost};

const HOT_RELOAD_SCRIPT: &str = r#"
<script>
    const socket = new WebSocket("ws://" + window.location.host + "/ws");
    socket.onmessage = (event) => {
        if (event.data === "reload") {
            window.location.reload();
        }
    };
</script>
"#;

pub const DEFAULT_LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{{ title }}</title>
    <link rel="stylesheet" href="/static/style.css">
</head>
<body>
{{ content }}
</body>
</html>
"#;

/// Wraps page bodies in the site layout.
#[derive(Debug, Clone)]
pub struct Layout {
    template: String,
    is_development: bool,
}

impl Layout {
    pub fn new(template: impl Into<String>, is_development: bool) -> Self {
        Layout {
            template: template.into(),
            is_development,
        }
    }

    pub fn render(&self, title: &str, content: &str) -> String {
        let mut page = self
            .template
            .replace("{{ title }}", &encode_minimal(title))
            .replace("{{ content }}", content);

        if self.is_development {
            page = page.replace("</body>", &format!("{}</body>", HOT_RELOAD_SCRIPT));
        }
        page
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::new(DEFAULT_LAYOUT, false)
    }
}

pub fn render_list_page(layout: &Layout, posts: &[PostSummary]) -> String {
    let mut cards = String::new();
    for post in posts {
        cards.push_str(&format!(
            "<a class=\"card\" href=\"/blogs/{}\"><h2>{}</h2><p>{}</p></a>",
            encode_minimal(&post.slug),
            encode_minimal(&post.title),
            encode_minimal(&post.meta)
        ));
    }
    let body = format!("<div class=\"container\">{cards}</div>");
    layout.render("Blogs", &body)
}

pub fn render_post_page(layout: &Layout, post: &RenderedPost) -> String {
    let body = format!(
        "<div class=\"container\"><h1>{}</h1><div class=\"prose\">{}</div></div>",
        encode_minimal(&post.title),
        post.content.compiled_source
    );
    layout.render(&post.title, &body)
}

pub fn render_not_found_page(layout: &Layout, slug: &str) -> String {
    let body = format!(
        "<div class=\"container\"><h1>Not found</h1><p>There is no post called <code>{}</code>.</p><p><a href=\"/blogs\">All posts</a></p></div>",
        encode_minimal(slug)
    );
    layout.render("Not found", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SerializedBody;

    fn summary(slug: &str, title: &str, meta: &str) -> PostSummary {
        PostSummary {
            slug: slug.into(),
            title: title.into(),
            meta: meta.into(),
        }
    }

    #[test]
    fn list_page_links_each_post() {
        let posts = vec![
            summary("hello-world", "Hello World", "first"),
            summary("second", "Second", "next"),
        ];
        let page = render_list_page(&Layout::default(), &posts);
        assert!(page.contains("href=\"/blogs/hello-world\""));
        assert!(page.contains("<h2>Second</h2>"));
        assert!(page.contains("<p>next</p>"));
        assert!(!page.contains("WebSocket"));
    }

    #[test]
    fn list_page_escapes_front_matter() {
        let posts = vec![summary("x", "<b>bold</b>", "a & b")];
        let page = render_list_page(&Layout::default(), &posts);
        assert!(page.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(page.contains("a &amp; b"));
    }

    #[test]
    fn post_page_embeds_compiled_source() {
        let post = RenderedPost {
            title: "Hello World".into(),
            content: SerializedBody {
                compiled_source: "<h1>Hi</h1>\n".into(),
                frontmatter: serde_json::json!({}),
            },
        };
        let page = render_post_page(&Layout::default(), &post);
        assert!(page.contains("<title>Hello World</title>"));
        assert!(page.contains("<div class=\"prose\"><h1>Hi</h1>"));
    }

    #[test]
    fn development_layout_injects_reload_script() {
        let layout = Layout::new(DEFAULT_LAYOUT, true);
        let page = render_not_found_page(&layout, "missing");
        assert!(page.contains("new WebSocket"));
        assert!(page.contains("<code>missing</code>"));
    }
}
