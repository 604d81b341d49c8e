use super::*;

#[test]
fn script_element_becomes_inert_text() {
    let out = sanitize_html("<script>alert(1)</script>");
    assert_eq!(out, "alert(1)");
    assert!(!out.contains("<script"));
}

#[test]
fn script_content_with_markup_is_escaped() {
    let out = sanitize_html("<script>document.write('<b>x</b>')</script>");
    assert_eq!(out, "document.write(&#39;&lt;b&gt;x&lt;/b&gt;&#39;)");
}

#[test]
fn allowed_tags_keep_only_class_and_style() {
    let out = sanitize_html(
        r#"<b onclick="steal()" class="hot" style="color:red" id="x">Sale</b>"#,
    );
    assert_eq!(out, r#"<b class="hot" style="color:red">Sale</b>"#);
}

#[test]
fn disallowed_element_is_replaced_by_its_text() {
    let out = sanitize_html(r#"Visit <a href="javascript:alert(1)">our <b>store</b></a> today"#);
    assert_eq!(out, "Visit our store today");
}

#[test]
fn void_disallowed_element_vanishes() {
    assert_eq!(sanitize_html(r#"<img src=x onerror=alert(1)>ok"#), "ok");
}

#[test]
fn comments_are_dropped() {
    assert_eq!(sanitize_html("a<!-- hidden <b>x</b> -->b"), "ab");
}

#[test]
fn stray_angle_brackets_are_escaped() {
    assert_eq!(sanitize_html("1 < 2 && 3 > 2"), "1 &lt; 2 &amp;&amp; 3 &gt; 2");
}

#[test]
fn entities_survive_round_trip() {
    assert_eq!(sanitize_html("Tom &amp; Jerry &lt;3"), "Tom &amp; Jerry &lt;3");
}

#[test]
fn unclosed_allowed_elements_are_closed() {
    assert_eq!(sanitize_html("<p><strong>Open"), "<p><strong>Open</strong></p>");
}

#[test]
fn attribute_values_are_escaped() {
    let out = sanitize_html(r#"<span class='a"b'>x</span>"#);
    assert_eq!(out, r#"<span class="a&quot;b">x</span>"#);
}

#[test]
fn literal_newline_escapes_become_breaks() {
    assert_eq!(
        sanitize_rich_text("  10:00-20:00\\nClosed Tuesdays  "),
        "10:00-20:00<br>Closed Tuesdays"
    );
}

#[test]
fn uppercase_tags_are_normalized() {
    assert_eq!(sanitize_html("<DIV>x</DIV>"), "<div>x</div>");
}

#[test]
fn plain_text_rendering_splits_on_breaks() {
    assert_eq!(
        rich_text_to_plain("<p>Mon-Fri</p>10:00\\n<b>Sat</b> 09:00"),
        "Mon-Fri\n10:00\nSat 09:00"
    );
}

#[test]
fn escape_covers_attribute_breakers() {
    assert_eq!(escape_html(r#"<a href="x">'"#), "&lt;a href=&quot;x&quot;&gt;&#39;");
}

#[test]
fn deep_nesting_is_flattened_past_the_depth_limit() {
    let depth = 100_000;
    let input = format!("{}deep{}", "<b>".repeat(depth), "</b>".repeat(depth));

    let out = sanitize_html(&input);

    assert_eq!(out.matches("<b>").count(), MAX_DEPTH);
    assert_eq!(out.matches("</b>").count(), MAX_DEPTH);
    assert!(out.contains("deep"));
    assert_eq!(rich_text_to_plain(&input), "deep");
}

#[test]
fn unclosed_deep_nesting_does_not_overflow() {
    let out = sanitize_html(&"<div><span>".repeat(50_000));
    assert_eq!(out.matches("<div>").count(), MAX_DEPTH / 2);
}

#[test]
fn end_tags_of_flattened_elements_do_not_close_kept_ancestors() {
    let input = format!("{}x{}after", "<b>".repeat(300), "</b>".repeat(300));
    let expected = format!("{}x{}after", "<b>".repeat(MAX_DEPTH), "</b>".repeat(MAX_DEPTH));
    assert_eq!(sanitize_html(&input), expected);
}
