//! Response classification.
//!
//! An ordered rule chain turns raw bytes plus their headers into a typed
//! body:
//!
//! 1. content type `application/json` with a quote byte at both ends:
//!    unwrap the quoted-base64 envelope into the working buffer
//! 2. empty working buffer: `empty`
//! 3. content type `application/json`, unless step 1 fired: `json`,
//!    pretty-printed
//! 4. content type containing `text/html`: `html`, as UTF-8 text
//! 5. an expected message type was supplied: decode through the schema
//!    bridge, degrading to `json` or `unknown` with a warning on
//!    mismatch
//! 6. otherwise: whatever step 1 established, or `unknown`
//!
//! The first matching rule wins. Steps 3 and 4 fail hard on undecodable
//! content; step 5 never does.

use std::borrow::Cow;

use protoprobe_core::{
    DecodeOutcome, ProtoCtx, content_type, deserialize_message, is_quoted, pretty_json,
    text_from_utf8, unwrap_base64_json_string,
};

use crate::error::ProbeError;
use crate::response::{BodyKind, BodyValue, ResponseBody};

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_HTML: &str = "text/html";

/// Classify raw response bytes into a typed body.
///
/// `headers` are the response's ordered pairs; `expected_message` names
/// the schema type protobuf payloads should decode as. Returns the body
/// together with the non-fatal schema warning, if any.
///
/// # Errors
///
/// Returns [`ProbeError::Decode`] when content declared as JSON does not
/// parse or HTML bytes are not UTF-8. Schema mismatches do not error;
/// they surface in the warning slot.
pub fn classify(
    raw: &[u8],
    headers: &[(String, String)],
    expected_message: Option<&str>,
    ctx: &ProtoCtx,
) -> Result<(ResponseBody, Option<String>), ProbeError> {
    let said_content_type = content_type(headers);
    let is_json = said_content_type.is_some_and(|ct| ct.eq_ignore_ascii_case(CONTENT_TYPE_JSON));
    let is_html = said_content_type.is_some_and(|ct| ct.contains(CONTENT_TYPE_HTML));

    // 1. Quoted payload detection. Only the working buffer is replaced;
    //    the final kind stays open until the chain below runs.
    let mut fallback_kind = BodyKind::Unknown;
    let working: Cow<'_, [u8]> = if is_json && is_quoted(raw) {
        fallback_kind = BodyKind::Base64ProtobufInJsonString;
        Cow::Owned(unwrap_base64_json_string(raw)?)
    } else {
        Cow::Borrowed(raw)
    };
    let unwrapped = fallback_kind == BodyKind::Base64ProtobufInJsonString;

    // 2..6. First matching rule wins.
    let (kind, value, warning) = if working.is_empty() {
        (BodyKind::Empty, BodyValue::None, None)
    } else if is_json && !unwrapped {
        (BodyKind::Json, BodyValue::Json(pretty_json(&working)?), None)
    } else if is_html {
        (BodyKind::Html, BodyValue::Html(text_from_utf8(&working)?), None)
    } else if let Some(type_name) = expected_message {
        match deserialize_message(&working, type_name, ctx) {
            DecodeOutcome::Valid { value } => {
                (BodyKind::Protobuf, BodyValue::Protobuf(value), None)
            }
            DecodeOutcome::Invalid {
                value: Some(text),
                error,
            } => (BodyKind::Json, BodyValue::Json(text), Some(error)),
            DecodeOutcome::Invalid { value: None, error } => {
                (BodyKind::Unknown, BodyValue::None, Some(error))
            }
        }
    } else {
        (fallback_kind, BodyValue::None, None)
    };

    Ok((
        ResponseBody {
            kind,
            value,
            size: working.len(),
        },
        warning,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::field_descriptor_proto::{Label, Type};
    use prost_types::{
        DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet,
    };
    use protoprobe_core::{MessageValue, serialize_message, wrap_base64_json_string};
    use serde_json::json;

    fn test_ctx() -> ProtoCtx {
        let file = FileDescriptorProto {
            name: Some("greeting.proto".to_string()),
            package: Some("acme.v1".to_string()),
            syntax: Some("proto3".to_string()),
            message_type: vec![DescriptorProto {
                name: Some("Greeting".to_string()),
                field: vec![FieldDescriptorProto {
                    name: Some("text".to_string()),
                    number: Some(1),
                    label: Some(Label::Optional as i32),
                    r#type: Some(Type::String as i32),
                    json_name: Some("text".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };

        ProtoCtx::from_file_descriptor_set(FileDescriptorSet { file: vec![file] }).unwrap()
    }

    fn json_headers() -> Vec<(String, String)> {
        vec![("content-type".to_string(), "application/json".to_string())]
    }

    #[test]
    fn test_plain_json() {
        let (body, warning) =
            classify(b"{\"a\":1}", &json_headers(), None, &test_ctx()).unwrap();

        assert_eq!(body.kind, BodyKind::Json);
        assert_eq!(body.value, BodyValue::Json("{\n  \"a\": 1\n}".to_string()));
        assert_eq!(body.size, 7);
        assert!(warning.is_none());
    }

    #[test]
    fn test_json_content_type_is_case_insensitive() {
        let headers = vec![("Content-Type".to_string(), "Application/JSON".to_string())];
        let (body, _) = classify(b"[1,2]", &headers, None, &test_ctx()).unwrap();
        assert_eq!(body.kind, BodyKind::Json);
    }

    #[test]
    fn test_json_with_charset_parameter_is_not_json() {
        // Only the exact media type triggers the JSON rules.
        let headers = vec![(
            "content-type".to_string(),
            "application/json; charset=utf-8".to_string(),
        )];
        let (body, _) = classify(b"{\"a\":1}", &headers, None, &test_ctx()).unwrap();
        assert_eq!(body.kind, BodyKind::Unknown);
        assert_eq!(body.size, 7);
    }

    #[test]
    fn test_json_parse_failure_is_fatal() {
        let err = classify(b"not json", &json_headers(), None, &test_ctx()).unwrap_err();

        match err {
            ProbeError::Decode(decode) => {
                let rendered = decode.to_string();
                assert!(rendered.contains("given json:\nnot json"));
            }
            other => panic!("expected Decode, got {other:?}"),
        }
    }

    #[test]
    fn test_html() {
        let headers = vec![(
            "content-type".to_string(),
            "text/html; charset=utf-8".to_string(),
        )];
        let (body, _) = classify(b"<p>Hi</p>", &headers, None, &test_ctx()).unwrap();

        assert_eq!(body.kind, BodyKind::Html);
        assert_eq!(body.value, BodyValue::Html("<p>Hi</p>".to_string()));
        assert_eq!(body.size, 9);
    }

    #[test]
    fn test_html_invalid_utf8_is_fatal() {
        let headers = vec![("content-type".to_string(), "text/html".to_string())];
        let err = classify(b"\xff\xfe", &headers, None, &test_ctx()).unwrap_err();
        assert!(matches!(err, ProbeError::Decode(_)));
    }

    #[test]
    fn test_empty_body() {
        let (body, warning) = classify(b"", &[], None, &test_ctx()).unwrap();
        assert_eq!(body.kind, BodyKind::Empty);
        assert_eq!(body.value, BodyValue::None);
        assert_eq!(body.size, 0);
        assert!(warning.is_none());
    }

    #[test]
    fn test_empty_beats_json_and_expected_type() {
        let (body, _) = classify(
            b"",
            &json_headers(),
            Some("acme.v1.Greeting"),
            &test_ctx(),
        )
        .unwrap();
        assert_eq!(body.kind, BodyKind::Empty);
    }

    #[test]
    fn test_enveloped_empty_payload_is_empty() {
        let (body, _) = classify(b"\"\"", &json_headers(), None, &test_ctx()).unwrap();
        assert_eq!(body.kind, BodyKind::Empty);
        assert_eq!(body.size, 0);
    }

    #[test]
    fn test_enveloped_without_expected_type() {
        // "aGVsbG8=" wraps the five bytes of "hello".
        let (body, warning) =
            classify(b"\"aGVsbG8=\"", &json_headers(), None, &test_ctx()).unwrap();

        assert_eq!(body.kind, BodyKind::Base64ProtobufInJsonString);
        assert_eq!(body.value, BodyValue::None);
        assert_eq!(body.size, 5);
        assert!(warning.is_none());
    }

    #[test]
    fn test_quoted_body_without_json_content_type_is_not_unwrapped() {
        // Quote bytes alone do not trigger the envelope; the declared
        // content type has to say JSON too.
        let (body, warning) = classify(b"\"aGVsbG8=\"", &[], None, &test_ctx()).unwrap();

        assert_eq!(body.kind, BodyKind::Unknown);
        assert_eq!(body.value, BodyValue::None);
        assert_eq!(body.size, 10);
        assert!(warning.is_none());
    }

    #[test]
    fn test_enveloped_protobuf_decodes_as_expected_type() {
        let ctx = test_ctx();
        let wire = serialize_message(
            &MessageValue::new("acme.v1.Greeting", json!({ "text": "hello" })),
            &ctx,
        )
        .unwrap();
        let enveloped = wrap_base64_json_string(&wire);

        let (body, warning) = classify(
            &enveloped,
            &json_headers(),
            Some("acme.v1.Greeting"),
            &ctx,
        )
        .unwrap();

        assert_eq!(body.kind, BodyKind::Protobuf);
        assert_eq!(body.size, wire.len());
        assert!(warning.is_none());
        match body.value {
            BodyValue::Protobuf(message) => {
                assert_eq!(message.fields, json!({ "text": "hello" }));
            }
            other => panic!("expected Protobuf, got {other:?}"),
        }
    }

    #[test]
    fn test_mismatch_with_presentable_bytes_degrades_to_json() {
        // No recognized content type, an expected type, and bytes that
        // are not valid wire format but do parse as JSON.
        let (body, warning) = classify(
            b"{\"a\":1}",
            &[],
            Some("acme.v1.Greeting"),
            &test_ctx(),
        )
        .unwrap();

        assert_eq!(body.kind, BodyKind::Json);
        assert_eq!(body.value, BodyValue::Json("{\n  \"a\": 1\n}".to_string()));
        assert!(warning.is_some());
    }

    #[test]
    fn test_mismatch_without_presentable_bytes_degrades_to_unknown() {
        let (body, warning) = classify(
            b"\xff\xff\xff\xff",
            &[],
            Some("acme.v1.Greeting"),
            &test_ctx(),
        )
        .unwrap();

        assert_eq!(body.kind, BodyKind::Unknown);
        assert_eq!(body.value, BodyValue::None);
        assert_eq!(body.size, 4);
        assert!(warning.is_some());
    }

    #[test]
    fn test_unknown_without_hints() {
        let (body, warning) = classify(b"anything", &[], None, &test_ctx()).unwrap();
        assert_eq!(body.kind, BodyKind::Unknown);
        assert_eq!(body.value, BodyValue::None);
        assert_eq!(body.size, 8);
        assert!(warning.is_none());
    }
}
