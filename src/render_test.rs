use super::*;
use crate::overlay::Phase;

fn view(text: &str, visible: bool) -> OverlayView {
    OverlayView { text: text.into(), visible, phase: if visible { Phase::Showing } else { Phase::Hidden } }
}

#[test]
fn escapes_markup_in_chat_text() {
    assert_eq!(escape_html(r#"<b>"hi" & 'bye'</b>"#), "&lt;b&gt;&quot;hi&quot; &amp; &#39;bye&#39;&lt;/b&gt;");
    assert_eq!(escape_html("plain"), "plain");
}

#[test]
fn position_follows_anchor() {
    assert_eq!(position_css(Anchor::BottomLeft), "bottom: 3rem; left: 3rem;");
    assert_eq!(position_css(Anchor::TopRight), "top: 3rem; right: 3rem;");
}

#[test]
fn page_prerenders_visible_view() {
    let html = overlay_page(&view("alice: hi", true), Anchor::BottomLeft);
    assert!(html.contains(r#"class="visible">alice: hi</div>"#), "{html}");
    assert!(html.contains("bottom: 3rem; left: 3rem;"));
    assert!(html.contains("transform: translateY(3rem);"));
    assert!(html.contains(r#"data-anchor="bottom-left""#));
    assert!(!html.contains("__"));
}

#[test]
fn page_hidden_view_has_no_visible_class() {
    let html = overlay_page(&view("alice: hi", false), Anchor::TopRight);
    assert!(html.contains(r#"class="">alice: hi</div>"#), "{html}");
    assert!(html.contains("transform: translateY(-3rem);"));
}

#[test]
fn page_escapes_injected_text() {
    let html = overlay_page(&view("mallory: <script>alert(1)</script>", true), Anchor::BottomRight);
    assert!(!html.contains("<script>alert(1)</script>"));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
}

#[test]
fn page_subscribes_to_view_stream() {
    let html = overlay_page(&view(": ", false), Anchor::BottomLeft);
    assert!(html.contains(r#"location.host + "/ws""#));
    assert!(html.contains("setTimeout(connect, 1000)"));
}
