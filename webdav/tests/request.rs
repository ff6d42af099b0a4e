// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Request building tests.

use davsync_webdav::{
    LockScope, LockType, guess_content_type, lock_body, lock_token_header, propfind_probe_body,
};

#[test]
fn request_probe_body_is_exact() {
    let xml = propfind_probe_body("https://example.com/remote/a").unwrap();
    assert_eq!(
        xml,
        r#"<?xml version="1.0" encoding="utf-8" ?><D:propfind xmlns:D="DAV:"><D:prop xmlns:R="https://example.com/remote/a"></D:prop></D:propfind>"#
    );
}

#[test]
fn request_probe_body_escapes_url() {
    let xml = propfind_probe_body("https://example.com/a?x=1&y=\"2\"").unwrap();
    assert!(xml.contains("x=1&amp;y=&quot;2&quot;"));
}

#[test]
fn request_lock_body_is_exact() {
    let xml = lock_body("alice", LockScope::Shared, LockType::Write).unwrap();
    assert_eq!(
        xml,
        r#"<?xml version="1.0" encoding="utf-8"?><DAV:lockinfo xmlns:DAV="DAV:"><DAV:lockscope><DAV:shared/></DAV:lockscope><DAV:locktype><DAV:write/></DAV:locktype><DAV:owner>alice</DAV:owner></DAV:lockinfo>"#
    );
}

#[test]
fn request_lock_token_is_wrapped_once() {
    assert_eq!(lock_token_header("opaquelocktoken:1"), "<opaquelocktoken:1>");
    assert_eq!(lock_token_header("<opaquelocktoken:1>"), "<opaquelocktoken:1>");
}

#[test]
fn request_content_type_guess() {
    assert_eq!(
        guess_content_type("https://example.com/a/b.txt"),
        (Some("text/plain".to_string()), None)
    );
    assert_eq!(
        guess_content_type("/a/data.json.bz2"),
        (Some("application/json".to_string()), Some("bzip2"))
    );
    assert_eq!(guess_content_type("/a/Makefile"), (None, None));
}
