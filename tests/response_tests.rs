
use tracing_util::TestTracing;
use waypoint::{Response, ResponseError};

fn sent(response: &mut Response) -> String {
    let mut sink = Vec::new();
    response.send(&mut sink).expect("send into a Vec cannot fail");
    String::from_utf8(sink).expect("responses are valid UTF-8")
}

#[test]
fn body_segments_concatenate_in_emission_order() {
    let mut response = Response::new();
    response.append("header", "<header>");
    response.append("main", "<main>");
    response.append("footer", "<footer>");
    assert_eq!(response.body(), "<header><main><footer>");
}

#[test]
fn replacing_a_segment_moves_it_to_the_end() {
    let mut response = Response::new();
    response.append("a", "1");
    response.append("b", "2");
    response.append("a", "3");
    assert_eq!(response.body(), "23");
}

#[test]
fn prepend_puts_a_segment_first() {
    let mut response = Response::new();
    response.append("main", "content");
    response.prepend("doctype", "<!doctype html>");
    assert_eq!(response.body(), "<!doctype html>content");
}

#[test]
fn set_body_resets_to_a_single_segment() {
    let mut response = Response::new();
    response.append("a", "1").append("b", "2");
    response.set_body("fresh");
    assert_eq!(response.body(), "fresh");
    response.append_body(" and more");
    assert_eq!(response.body(), "fresh and more");
}

#[test]
fn clear_body_by_name_and_wholesale() {
    let mut response = Response::new();
    response.append("a", "1").append("b", "2");
    assert!(response.clear_body(Some("a")));
    assert!(!response.clear_body(Some("a")));
    assert_eq!(response.body(), "2");
    assert!(response.clear_body(None));
    assert_eq!(response.body(), "");
}

#[test]
fn replace_or_append_header_semantics() {
    let mut response = Response::new();
    response.set_header("content-type", "text/html", true);
    response.set_header("set-cookie", "a=1", false);
    response.set_header("set-cookie", "b=2", false);
    response.set_header("CONTENT_TYPE", "application/json", true);

    let headers = response.headers();
    let cookies: Vec<_> = headers
        .iter()
        .filter(|(name, _)| name == "Set-Cookie")
        .collect();
    assert_eq!(cookies.len(), 2);
    assert_eq!(response.header("Content-Type"), Some("application/json"));
    assert_eq!(
        headers
            .iter()
            .filter(|(name, _)| name == "Content-Type")
            .count(),
        1
    );
}

#[test]
fn send_emits_status_line_raw_then_typed_headers() {
    let mut response = Response::new();
    response.set_header("content-type", "text/plain", true);
    response.set_raw_header("X-Raw: yes");
    response.set_body("hello");
    response.set_status(201).expect("201 is valid");

    let wire = sent(&mut response);
    assert_eq!(
        wire,
        "HTTP/1.1 201 Created\r\nX-Raw: yes\r\nContent-Type: text/plain\r\n\r\nhello"
    );
}

#[test]
fn raw_status_line_suppresses_the_generated_one() {
    let mut response = Response::new();
    response.set_raw_header("HTTP/1.1 299 Custom");
    response.set_body("x");

    let wire = sent(&mut response);
    assert!(wire.starts_with("HTTP/1.1 299 Custom\r\n"));
    assert_eq!(wire.matches("HTTP/1.1").count(), 1);
}

#[test]
fn second_send_is_a_no_op() {
    let _tracing = TestTracing::init();
    let mut response = Response::new();
    response.set_body("once");

    let first = sent(&mut response);
    assert!(first.ends_with("once"));
    assert!(response.sent());

    let mut sink = Vec::new();
    response.send(&mut sink).expect("repeat send returns Ok");
    assert!(sink.is_empty());
}

#[test]
fn out_of_range_statuses_are_rejected() {
    let mut response = Response::new();
    assert_eq!(
        response.set_status(99),
        Err(ResponseError::InvalidStatusCode(99))
    );
    assert_eq!(
        response.set_status(600),
        Err(ResponseError::InvalidStatusCode(600))
    );
    assert!(response.set_status(100).is_ok());
    assert!(response.set_status(599).is_ok());
}

#[test]
fn redirect_helper_sets_location_and_flag() {
    let mut response = Response::new();
    response
        .set_redirect("https://example.test/next", 302)
        .expect("302 is valid");
    assert!(response.is_redirect());
    assert_eq!(response.status(), 302);
    assert_eq!(response.header("Location"), Some("https://example.test/next"));

    let wire = sent(&mut response);
    assert!(wire.starts_with("HTTP/1.1 302 Found\r\n"));
    assert!(wire.contains("Location: https://example.test/next\r\n"));
}

#[test]
fn raw_location_header_marks_a_redirect() {
    let mut response = Response::new();
    response.set_raw_header("Location: /elsewhere");
    assert!(response.is_redirect());
}
