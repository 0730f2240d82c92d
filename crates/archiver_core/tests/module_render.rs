use archiver_core::{extract_hosted_links, parse_document, render, ModuleRender};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn init_logging() {
    archiver_logging::initialize_for_tests();
}

fn page_payload(modules: Vec<Value>) -> String {
    let children: Vec<Value> = modules.into_iter().map(|m| json!({ "course": m })).collect();
    json!({"props": {"pageProps": {"course": {"children": children}}}}).to_string()
}

fn bullet_description() -> String {
    let tree = json!([
        {"type": "bulletList", "content": [
            {"type": "listItem", "content": [{"type": "paragraph", "content": [
                {"type": "text", "text": "Read the "},
                {"type": "text", "text": "docs", "marks": [{"type": "link", "attrs": {"href": "https://example.com/docs"}}]}
            ]}]},
            {"type": "listItem", "content": [{"type": "paragraph", "content": [
                {"type": "text", "text": "Watch the video"}
            ]}]}
        ]}
    ]);
    format!("[v2]{tree}")
}

#[test]
fn module_with_list_and_payload_video_link() {
    init_logging();
    let desc = bullet_description();
    let payload = page_payload(vec![
        json!({"id": "other", "metadata": {"desc": "ignored", "videoLink": "https://vimeo.com/999"}}),
        json!({"id": "m1", "metadata": {"desc": desc, "videoLink": "https://vimeo.com/111/aaa"}}),
    ]);

    let output = render("m1", &payload);

    assert_eq!(output.description_html.matches("<ul>").count(), 1);
    assert_eq!(output.description_html.matches("<li>").count(), 2);
    assert!(output
        .description_html
        .contains(r#"<a href="https://example.com/docs" target="_blank">docs</a>"#));
    assert!(extract_hosted_links(&parse_document(&desc)).is_empty());

    assert_eq!(output.plan.len(), 1);
    let video = &output.plan[0];
    assert_eq!(video.media.reference, "https://vimeo.com/111/aaa");
    assert_eq!(video.media.url, "https://player.vimeo.com/video/111?h=aaa");
    assert_eq!(
        video.candidates,
        vec![
            "https://player.vimeo.com/video/111?h=aaa",
            "https://player.vimeo.com/video/111",
            "https://vimeo.com/111/aaa",
            "https://vimeo.com/111",
        ]
    );
}

#[test]
fn payload_and_description_links_to_the_same_video_merge() {
    init_logging();
    let desc = json!([{"type": "paragraph", "content": [
        {"type": "text", "text": "watch", "marks": [{"type": "link", "attrs": {"href": "https://player.vimeo.com/video/5"}}]},
        {"type": "text", "text": "loom", "marks": [{"type": "link", "attrs": {"href": "https://www.loom.com/share/abc"}}]}
    ]}])
    .to_string();
    let payload = page_payload(vec![json!({
        "id": "m",
        "metadata": {"desc": desc},
        "lessons": [{"quiz": {"videoLink": "https://vimeo.com/5"}}]
    })]);

    let output = render("m", &payload);
    let urls: Vec<&str> = output.plan.iter().map(|v| v.media.url.as_str()).collect();
    assert_eq!(
        urls,
        vec!["https://player.vimeo.com/video/5", "https://www.loom.com/share/abc"]
    );
    assert_eq!(output.plan[0].media.reference, "https://vimeo.com/5");
    assert_eq!(output.plan[0].candidates, vec!["https://player.vimeo.com/video/5"]);
    assert_eq!(output.plan[1].candidates, vec!["https://www.loom.com/share/abc"]);
}

#[test]
fn rendered_editor_json_is_replaced_by_plain_text() {
    init_logging();
    let desc = json!([{"type": "paragraph", "content": [{"type": "text", "text": "see [{x}]"}]}]).to_string();
    let payload = page_payload(vec![json!({"id": "m", "metadata": {"desc": desc}})]);

    let output = render("m", &payload);
    assert!(output.description_html.starts_with("<p>[{"));
    assert!(!output.description_html.contains("<p>see"));
}

#[test]
fn quoted_json_in_prose_keeps_the_rich_rendering() {
    init_logging();
    let desc = json!([
        {"type": "paragraph", "content": [{"type": "text", "text": "Add {\"type\":\"module\"} to package.json"}]},
        {"type": "paragraph", "content": [{"type": "text", "text": "Second", "marks": [{"type": "bold"}]}]}
    ])
    .to_string();
    let payload = page_payload(vec![json!({"id": "m", "metadata": {"desc": desc}})]);

    let output = render("m", &payload);
    assert_eq!(
        output.description_html,
        "<p>Add {&quot;type&quot;:&quot;module&quot;} to package.json</p>\n<p><strong>Second</strong></p>"
    );
}

#[test]
fn missing_module_or_bad_payload_renders_empty() {
    init_logging();
    let payload = page_payload(vec![json!({"id": "a", "metadata": {"desc": "x"}})]);
    assert_eq!(render("b", &payload), ModuleRender::default());
    assert_eq!(render("a", "<html>not json"), ModuleRender::default());
    assert_eq!(render("a", ""), ModuleRender::default());
}

#[test]
fn module_without_description_has_no_html() {
    init_logging();
    let payload = page_payload(vec![json!({"id": "a", "metadata": {}})]);
    let output = render("a", &payload);
    assert_eq!(output.description_html, "");
    assert!(output.plan.is_empty());
}
