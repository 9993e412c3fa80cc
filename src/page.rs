//! Page assembly: one `index.html` and one `style.css` per document.

use crate::html::escape;
use crate::layout::{Bucket, CssRule, Layout};
use crate::types::{css_rgb, Document};

const FONTS_STYLESHEET: &str = "https://fonts.googleapis.com/css2?family=Lato:ital,wght@0,100;0,300;0,400;0,700;0,900;1,100;1,300;1,400;1,700;1,900&display=swap";
const ANIMATION_STYLESHEET: &str = "https://digital.mediaferry.com/animation.css";
const CONTAINER_BORDER: &str = "1px solid #7a8599";

/// Buckets inside the `.contentSection` wrapper, in document order.
const CONTENT_BUCKETS: [Bucket; 5] = [
    Bucket::MainHeading,
    Bucket::SubHeading,
    Bucket::Offer,
    Bucket::ContactWrap,
    Bucket::Cta,
];

const CLICK_SCRIPT: &str = r#"<script>
    function getQueryStringValue(key) {
        return decodeURIComponent(window.location.search.replace(new RegExp("^(?:.*[&\\?]" + escape(key).replace(/[\.\+\*]/g, "\\$&") + "(?:\\=([^&]*))?)?.*$", "i"), "$1"));
    }

    var clickTag = document.getElementById("sd_btn_Click-Through-URL").getAttribute("href");
    var trackingUrl = getQueryStringValue("trackurl");
    var resURL = trackingUrl + clickTag;

    var elements = document.getElementsByClassName("clicktru");

    for (var i = 0; i < elements.length; i++) {
        elements[i].setAttribute("href", resURL);
    }
</script>"#;

#[derive(Debug, Clone)]
pub struct Page {
    pub html: String,
    pub css: String,
}

pub fn assemble(doc: &Document, layout: &Layout) -> Page {
    Page {
        html: render_html(doc, layout),
        css: render_css(doc, layout),
    }
}

fn render_html(doc: &Document, layout: &Layout) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\" />\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n");
    html.push_str(&format!(
        "<meta name=\"ad.size\" content=\"width={},height={}\" />\n",
        doc.width, doc.height
    ));
    html.push_str("<meta http-equiv=\"X-UA-Compatible\" content=\"ie=edge\" />\n");
    html.push_str(&format!("<title>{}</title>\n", escape(&doc.name)));
    html.push_str("<link rel=\"preconnect\" href=\"https://fonts.googleapis.com\" />\n");
    html.push_str("<link rel=\"preconnect\" href=\"https://fonts.gstatic.com\" crossorigin />\n");
    html.push_str(&format!("<link href=\"{FONTS_STYLESHEET}\" rel=\"stylesheet\">\n"));
    html.push_str(&format!("<link rel=\"stylesheet\" href=\"{ANIMATION_STYLESHEET}\">\n"));
    html.push_str("<link rel=\"stylesheet\" href=\"./css/style.css\" />\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<div class=\"container\" id=\"sd_bgcolor_Main-Background\">\n");
    html.push_str("<a href=\"javascript:window.open(window.trackingUrl + window.clickTag)\"></a>\n");
    html.push_str("<a class=\"clicktru\" target=\"_blank\" href=\"#\"></a>\n");

    for bucket in [Bucket::Shapes, Bucket::Logo] {
        push_fragments(&mut html, layout.fragments(bucket));
    }
    html.push_str("<div class=\"contentSection\">\n");
    for bucket in CONTENT_BUCKETS {
        push_fragments(&mut html, layout.fragments(bucket));
    }
    html.push_str("</div>\n");
    push_fragments(&mut html, layout.fragments(Bucket::MainImages));

    html.push_str("</div>\n");
    html.push_str(CLICK_SCRIPT);
    html.push_str("\n</body>\n</html>\n");
    html
}

fn push_fragments(html: &mut String, fragments: &[String]) {
    for fragment in fragments {
        html.push_str(fragment);
        html.push('\n');
    }
}

fn render_css(doc: &Document, layout: &Layout) -> String {
    let (width, height) = (doc.width as i32, doc.height as i32);
    let background = layout
        .background
        .map(css_rgb)
        .unwrap_or_else(|| "transparent".to_string());

    let preamble = [
        CssRule::new("*")
            .decl("margin", "0px")
            .decl("padding", "0px")
            .decl("box-sizing", "border-box"),
        CssRule::new(":root")
            .px("--width", width)
            .px("--height", height),
        CssRule::new(".container")
            .px("width", width)
            .px("height", height)
            .decl("position", "relative")
            .decl("overflow", "hidden")
            .decl("border", CONTAINER_BORDER)
            .decl("background-color", background),
        CssRule::new(".clicktru")
            .decl("z-index", "9999")
            .decl("width", "100%")
            .decl("height", "100%")
            .decl("position", "absolute"),
        CssRule::new("a").decl("text-decoration", "none"),
        CssRule::new("#sd_btn_Click-Through-URL:empty").decl("display", "none"),
    ];

    preamble
        .iter()
        .chain(&layout.rules)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_doc() -> Document {
        Document {
            name: "banner300x600".to_string(),
            width: 300,
            height: 600,
            layers: Vec::new(),
        }
    }

    #[test]
    fn empty_layout_still_has_sized_container() {
        let page = assemble(&empty_doc(), &Layout::default());
        assert_eq!(page.html.matches("class=\"container\"").count(), 1);
        assert!(page.html.contains("content=\"width=300,height=600\""));
        assert!(page.html.contains("<title>banner300x600</title>"));
        assert!(page.css.contains("--width: 300px;"));
        assert!(page.css.contains("--height: 600px;"));
        assert!(page.css.contains("background-color: transparent;"));
    }

    #[test]
    fn content_section_wraps_text_buckets_only() {
        let page = assemble(&empty_doc(), &Layout::default());
        let open = page.html.find("<div class=\"contentSection\">").unwrap_or(usize::MAX);
        let overlay = page.html.find("class=\"clicktru\"").unwrap_or(usize::MAX);
        let script = page.html.find("<script>").unwrap_or(0);
        assert!(overlay < open && open < script);
        assert!(page.html.contains("getQueryStringValue(\"trackurl\")"));
    }
}
