//! Resolving a request builder into a transport-ready descriptor.
//!
//! Substitution covers the URL, every header value, and the string
//! leaves of the protobuf body. The body is then serialized through the
//! schema bridge and wrapped in the quoted-base64 envelope the invoke
//! transport expects.

use protoprobe_core::{ProtoCtx, serialize_message, try_rewrite_strings, wrap_base64_json_string};

use crate::env::{Environment, UnresolvedPolicy, apply_vars};
use crate::error::ProbeError;
use crate::invoke::LAMBDA_URL_PREFIX;
use crate::request::{BodyType, RequestBuilder, RequestDescriptor};

/// Resolve a builder plus an environment into a [`RequestDescriptor`].
///
/// A body is produced only when all three hold: the body type is
/// [`BodyType::Protobuf`], a message tree is present, and the resolved
/// URL starts with the `https://lambda/` routing prefix. Requests to
/// ordinary HTTP endpoints never carry a protobuf body.
///
/// # Errors
///
/// Propagates substitution failures raised under
/// [`UnresolvedPolicy::Error`] and schema failures from serializing the
/// body.
pub fn resolve(
    builder: &RequestBuilder,
    env: &Environment,
    ctx: &ProtoCtx,
    policy: UnresolvedPolicy,
) -> Result<RequestDescriptor, ProbeError> {
    let vars = env.var_map();

    // 1. Substitute into the URL first: the body gate below tests the
    //    resolved form.
    let url =
        apply_vars(&builder.url, &vars, policy).map_err(|e| ProbeError::Encode(e.to_string()))?;

    // 2. Substitute into every header value. Names stay literal.
    let headers = builder
        .headers
        .iter()
        .map(|(name, value)| apply_vars(value, &vars, policy).map(|value| (name.clone(), value)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ProbeError::Encode(e.to_string()))?;

    // 3. Substitute into the body's string leaves, serialize, envelope.
    let body = match (builder.body_type, &builder.protobuf_body) {
        (BodyType::Protobuf, Some(message)) if url.starts_with(LAMBDA_URL_PREFIX) => {
            let message = try_rewrite_strings(message, |s| apply_vars(s, &vars, policy))
                .map_err(|e| ProbeError::Encode(e.to_string()))?;
            let encoded = serialize_message(&message, ctx)?;
            Some(wrap_base64_json_string(&encoded))
        }
        _ => None,
    };

    Ok(RequestDescriptor {
        url,
        method: builder.method.clone(),
        headers,
        body,
        expected_message: builder.expected_message.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use prost_types::field_descriptor_proto::{Label, Type};
    use prost_types::{
        DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet,
    };
    use protoprobe_core::{MessageValue, unwrap_base64_json_string};
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

    fn greeting_builder(url: &str) -> RequestBuilder {
        RequestBuilder {
            method: Method::POST,
            url: url.to_string(),
            headers: vec![],
            body_type: BodyType::Protobuf,
            protobuf_body: Some(MessageValue::new(
                "acme.v1.Greeting",
                json!({ "text": "{{greet}}" }),
            )),
            expected_message: Some("acme.v1.Greeting".to_string()),
        }
    }

    #[test]
    fn test_substitutes_url_and_headers() {
        let builder = RequestBuilder {
            method: Method::GET,
            url: "https://{{host}}/items".to_string(),
            headers: vec![
                ("authorization".to_string(), "Bearer {{token}}".to_string()),
                ("x-{{host}}".to_string(), "untouched-name".to_string()),
            ],
            ..Default::default()
        };
        let env = Environment::new("test")
            .var("host", "api.example.com")
            .var("token", "secret");

        let request = resolve(&builder, &env, &test_ctx(), UnresolvedPolicy::Keep).unwrap();

        assert_eq!(request.url, "https://api.example.com/items");
        assert_eq!(request.headers[0].1, "Bearer secret");
        // Header names are not templates.
        assert_eq!(request.headers[1].0, "x-{{host}}");
        assert_eq!(request.method, Method::GET);
    }

    #[test]
    fn test_non_lambda_url_gets_no_body() {
        let builder = greeting_builder("https://api.example.com/greet");
        let env = Environment::new("test").var("greet", "hello");

        let request = resolve(&builder, &env, &test_ctx(), UnresolvedPolicy::Keep).unwrap();

        assert!(request.body.is_none());
        assert_eq!(
            request.expected_message.as_deref(),
            Some("acme.v1.Greeting")
        );
    }

    #[test]
    fn test_lambda_url_gets_enveloped_body() {
        let builder = greeting_builder("https://lambda/myFn");
        let env = Environment::new("test").var("greet", "hello");

        let request = resolve(&builder, &env, &test_ctx(), UnresolvedPolicy::Keep).unwrap();

        let body = request.body.unwrap();
        assert_eq!(body[0], b'"');
        assert_eq!(body[body.len() - 1], b'"');
        // Substituted leaf, then serialized: field 1, "hello".
        let wire = unwrap_base64_json_string(&body).unwrap();
        assert_eq!(wire, b"\x0a\x05hello");
    }

    #[test]
    fn test_body_gate_uses_resolved_url() {
        let builder = greeting_builder("{{target}}/myFn");
        let env = Environment::new("test")
            .var("target", "https://lambda")
            .var("greet", "hi");

        let request = resolve(&builder, &env, &test_ctx(), UnresolvedPolicy::Keep).unwrap();

        assert_eq!(request.url, "https://lambda/myFn");
        assert!(request.body.is_some());
    }

    #[test]
    fn test_body_type_none_skips_body() {
        let mut builder = greeting_builder("https://lambda/myFn");
        builder.body_type = BodyType::None;
        let env = Environment::new("test").var("greet", "hello");

        let request = resolve(&builder, &env, &test_ctx(), UnresolvedPolicy::Keep).unwrap();

        assert!(request.body.is_none());
    }

    #[test]
    fn test_unresolved_error_policy_stops_resolution() {
        let builder = RequestBuilder {
            url: "https://{{host}}/items".to_string(),
            ..Default::default()
        };
        let env = Environment::new("empty");

        let err = resolve(&builder, &env, &test_ctx(), UnresolvedPolicy::Error).unwrap_err();

        match err {
            ProbeError::Encode(message) => assert!(message.contains("host")),
            other => panic!("expected Encode, got {other:?}"),
        }
    }

    #[test]
    fn test_schema_mismatch_fails_resolution() {
        let mut builder = greeting_builder("https://lambda/myFn");
        builder.protobuf_body = Some(MessageValue::new(
            "acme.v1.Greeting",
            json!({ "unknown_field": 1 }),
        ));
        let env = Environment::new("test");

        let err = resolve(&builder, &env, &test_ctx(), UnresolvedPolicy::Keep).unwrap_err();

        assert!(matches!(err, ProbeError::Bridge(_)));
    }
}
