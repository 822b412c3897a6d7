//! Full HTML page around a rendered block body.

use std::fmt::Write;

use folio_blocks::Document;
use folio_renderer::escape_html;

use crate::site::SiteSettings;

const PREVIEW_BANNER: &str = r#"<div class="folio-preview-banner" role="status"><strong>Preview Mode</strong> - This is how your page will appear to visitors</div>"#;

fn meta_name(out: &mut String, name: &str, content: &str) {
    writeln!(
        out,
        r#"<meta name="{name}" content="{}">"#,
        escape_html(content)
    )
    .unwrap();
}

fn meta_property(out: &mut String, property: &str, content: &str) {
    writeln!(
        out,
        r#"<meta property="{property}" content="{}">"#,
        escape_html(content)
    )
    .unwrap();
}

/// Wrap `body` in an HTML document with the page's SEO head.
pub(crate) fn page_shell(
    document: &Document,
    body: &str,
    settings: &SiteSettings,
    preview: bool,
) -> String {
    let seo = document.seo();
    let title = seo.title.as_deref().unwrap_or(document.title());
    let description = seo
        .description
        .as_deref()
        .or_else(|| Some(settings.description.as_str()).filter(|d| !d.is_empty()));

    let mut out = String::with_capacity(body.len() + 1024);
    out.push_str("<!DOCTYPE html>\n");
    writeln!(out, r#"<html lang="{}">"#, escape_html(&settings.language)).unwrap();
    out.push_str("<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    meta_name(&mut out, "viewport", "width=device-width, initial-scale=1");
    writeln!(out, "<title>{}</title>", escape_html(title)).unwrap();
    if let Some(description) = description {
        meta_name(&mut out, "description", description);
    }
    if let Some(keywords) = seo.keywords.as_deref() {
        meta_name(&mut out, "keywords", keywords);
    }
    if preview {
        meta_name(&mut out, "robots", "noindex");
    }
    meta_property(&mut out, "og:title", title);
    if let Some(description) = description {
        meta_property(&mut out, "og:description", description);
    }
    meta_property(&mut out, "og:type", "website");
    if !settings.name.is_empty() {
        meta_property(&mut out, "og:site_name", &settings.name);
    }
    if let Some(url) = &settings.url {
        let page_url = format!("{}/{}", url.trim_end_matches('/'), document.slug());
        meta_property(&mut out, "og:url", &page_url);
    }
    if let Some(image) = document.featured_image() {
        meta_property(&mut out, "og:image", image);
    }
    out.push_str("</head>\n<body>\n");
    if preview {
        out.push_str(PREVIEW_BANNER);
        out.push('\n');
    }
    writeln!(
        out,
        r#"<main class="folio-page" data-page-id="{}">"#,
        document.id()
    )
    .unwrap();
    out.push_str(body);
    out.push_str("\n</main>\n</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use folio_blocks::Seo;

    use super::*;

    fn settings() -> SiteSettings {
        SiteSettings {
            name: "Acme".to_owned(),
            description: "Acme widgets".to_owned(),
            url: Some("https://acme.test/".to_owned()),
            language: "en".to_owned(),
        }
    }

    #[test]
    fn test_title_falls_back_to_page_title() {
        let doc = Document::new("About <us>", "about").unwrap();

        let html = page_shell(&doc, "", &settings(), false);

        assert!(html.contains("<title>About &lt;us&gt;</title>"));
        assert!(html.contains(r#"<meta property="og:title" content="About &lt;us&gt;">"#));
        assert!(html.contains(r#"<meta property="og:type" content="website">"#));
        assert!(html.contains(r#"<meta property="og:url" content="https://acme.test/about">"#));
    }

    #[test]
    fn test_seo_fields_win() {
        let mut doc = Document::new("About", "about").unwrap();
        doc.set_seo(Seo {
            title: Some("About Acme".to_owned()),
            description: Some("Who we are".to_owned()),
            keywords: Some("acme, about".to_owned()),
        });

        let html = page_shell(&doc, "", &settings(), false);

        assert!(html.contains("<title>About Acme</title>"));
        assert!(html.contains(r#"<meta name="description" content="Who we are">"#));
        assert!(html.contains(r#"<meta name="keywords" content="acme, about">"#));
        assert!(html.contains(r#"<meta property="og:description" content="Who we are">"#));
    }

    #[test]
    fn test_description_falls_back_to_site() {
        let doc = Document::new("About", "about").unwrap();

        let html = page_shell(&doc, "", &settings(), false);

        assert!(html.contains(r#"<meta name="description" content="Acme widgets">"#));
        assert!(!html.contains("keywords"));
    }

    #[test]
    fn test_preview_banner_only_in_preview() {
        let doc = Document::new("About", "about").unwrap();

        let public = page_shell(&doc, "<p>x</p>", &settings(), false);
        let preview = page_shell(&doc, "<p>x</p>", &settings(), true);

        assert!(!public.contains("Preview Mode"));
        assert!(preview.contains("Preview Mode"));
        assert!(preview.contains(r#"<meta name="robots" content="noindex">"#));
        assert!(public.contains("<p>x</p>"));
    }
}
