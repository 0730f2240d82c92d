//! Static HTML documents written next to the downloaded media.
use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::filename::clean_title;
use crate::{CourseRecord, VideoRecord};

pub const MODULE_PAGE: &str = "module.html";
pub const INDEX_PAGE: &str = "index.html";

const INDEX_TITLE: &str = "Course Archive";

const STYLESHEET: &str = "\
    body { font-family: Arial, sans-serif; line-height: 1.5; max-width: 800px; margin: 2rem auto; padding: 1rem; background-color: #fff; color: #333; }
    h1, h2, h3, h4, h5, h6 { margin-top: 1.2em; margin-bottom: 0.6em; color: #222; }
    .content { font-family: inherit; margin-bottom: 2em; }
    p { margin: 0.8em 0; }
    ul, ol { margin: 0.6em 0 0.6em 2em; }
    li { margin: 0.4em 0; }
    a { color: #007bff; text-decoration: none; }
    a:hover { text-decoration: underline; }
    strong { font-weight: 700; }
    em { font-style: italic; }
    blockquote { color: #666; border-left: 4px solid #eee; margin: 0.8em 0; padding-left: 1em; font-style: italic; }
    .video-wrapper { margin-bottom: 2em; }
    .video-wrapper p { margin-bottom: 0.3em; }
    br { margin-bottom: 8px; }";

/// Standalone page for one module: description fragment, then one player per video.
pub fn module_page(title: &str, description_html: &str, videos: &[VideoRecord]) -> String {
    let title = encode_text(title);
    let mut out = String::new();
    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html lang=\"en\">");
    let _ = writeln!(out, "<head>");
    let _ = writeln!(out, "  <meta charset=\"utf-8\">");
    let _ = writeln!(out, "  <title>{title}</title>");
    let _ = writeln!(out, "  <style>\n{STYLESHEET}\n  </style>");
    let _ = writeln!(out, "</head>");
    let _ = writeln!(out, "<body>");
    let _ = writeln!(out, "<h1>{title}</h1>");

    if description_html.is_empty() {
        let _ = writeln!(out, "<p><i>No description for this module</i></p>");
    } else {
        let _ = writeln!(out, "<div class=\"content\">{description_html}</div>");
    }

    if videos.is_empty() {
        let _ = writeln!(out, "<p><i>No videos in this module</i></p>");
    } else {
        let _ = writeln!(out, "<h2>Videos (offline)</h2>");
        for video in videos {
            let name = encode_text(&video.filename);
            let src = encode_double_quoted_attribute(&video.filename);
            let source_url = encode_text(&video.source_url);
            let _ = writeln!(out, "<div class=\"video-wrapper\">");
            let _ = writeln!(out, "  <p><b>{name}</b> (<i>{source_url}</i>)</p>");
            let _ = writeln!(out, "  <video controls style=\"width:100%; max-width:600px;\">");
            let _ = writeln!(out, "    <source src=\"{src}\" type=\"video/mp4\">");
            let _ = writeln!(out, "    Your browser does not support HTML5 video.");
            let _ = writeln!(out, "  </video>");
            let _ = writeln!(out, "</div>");
        }
    }

    let _ = writeln!(out, "</body></html>");
    out
}

/// Archive root page linking every module page, grouped by course.
pub fn index_page(courses: &[CourseRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{INDEX_TITLE}</title></head><body>"
    );
    let _ = writeln!(out, "<h1>{INDEX_TITLE}</h1>");
    for course in courses {
        let course_dir = clean_title(&course.title);
        let _ = write!(out, "<h2>{}</h2><ul>", encode_text(&course.title));
        for module in &course.modules {
            let href = format!("{course_dir}/{}/{MODULE_PAGE}", clean_title(&module.title));
            let _ = write!(
                out,
                "<li><a href=\"{}\">{}</a></li>",
                encode_double_quoted_attribute(&href),
                encode_text(&module.title)
            );
        }
        let _ = writeln!(out, "</ul>");
    }
    let _ = writeln!(out, "</body></html>");
    out
}
