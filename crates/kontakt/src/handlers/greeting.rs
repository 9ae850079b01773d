//! `GET /hello/{name?}`.

use kontakt_core::{HandlerResult, Reply, RequestContext, ValidatedRequest};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::Rng;

/// Characters left unescaped by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const TOKEN_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of the anonymous greeting token.
pub const TOKEN_LEN: usize = 8;

/// Returns a random base-36 token of [`TOKEN_LEN`] uppercase characters.
#[must_use]
pub fn anonymous_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LEN)
        .map(|_| char::from(TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())]))
        .collect()
}

/// Formats the greeting for an optional name.
///
/// ```
/// use kontakt::handlers::greeting::greeting;
///
/// assert_eq!(greeting(Some("alice")), "Hello 'alice' :)");
/// assert!(greeting(None).starts_with("Hello anonymous '"));
/// ```
#[must_use]
pub fn greeting(name: Option<&str>) -> String {
    match name.filter(|name| !name.is_empty()) {
        Some(name) => format!("Hello '{}' :)", utf8_percent_encode(name, URI_COMPONENT)),
        None => format!("Hello anonymous '{}' :)", anonymous_token()),
    }
}

/// Greets the named user, or an anonymous one.
pub async fn hello(_ctx: RequestContext, req: ValidatedRequest) -> HandlerResult {
    Ok(Reply::text(greeting(req.param("name"))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_named_greeting() {
        assert_eq!(greeting(Some("alice")), "Hello 'alice' :)");
    }

    #[test]
    fn test_name_is_uri_component_encoded() {
        assert_eq!(greeting(Some("a b")), "Hello 'a%20b' :)");
        assert_eq!(greeting(Some("O'Neil")), "Hello 'O'Neil' :)");
        assert_eq!(greeting(Some("zażółć")), "Hello 'za%C5%BC%C3%B3%C5%82%C4%87' :)");
        assert_eq!(greeting(Some("a/b?c")), "Hello 'a%2Fb%3Fc' :)");
    }

    #[test]
    fn test_anonymous_greeting() {
        let text = greeting(None);
        let token = text
            .strip_prefix("Hello anonymous '")
            .and_then(|rest| rest.strip_suffix("' :)"))
            .unwrap();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.bytes().all(|b| TOKEN_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_empty_name_is_anonymous() {
        assert!(greeting(Some("")).starts_with("Hello anonymous '"));
    }

    proptest::proptest! {
        #[test]
        fn alphanumeric_names_are_unchanged(name in "[a-zA-Z0-9]{3,30}") {
            proptest::prop_assert_eq!(greeting(Some(&name)), format!("Hello '{name}' :)"));
        }
    }

    #[tokio::test]
    async fn test_hello_handler() {
        let req = ValidatedRequest::new(json!({ "name": "bob" }), json!({}), Value::Null);
        let reply = hello(RequestContext::new(), req).await.unwrap();
        assert_eq!(reply.into_bytes(), "Hello 'bob' :)");
    }
}
