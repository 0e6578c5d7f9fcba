//! AWS SigV4 test-suite vectors, checked stage by stage: canonical request hash, string to sign, signature, and
//! `Authorization` value.
//!
//! The `.req` files from the suite are embedded verbatim. Cases whose canonical headers depend on AWS folding internal
//! whitespace or keeping duplicate values in insertion order are not included; those rules differ here (values are
//! trimmed at the ends only and sorted).

use {
    crate::{
        augment::request_timestamp,
        canonical::{body_sha256, CanonicalRequest},
        Signer,
    },
    bytes::Bytes,
    http::{
        header::HeaderValue,
        method::Method,
        request::Request,
        uri::{PathAndQuery, Uri},
        version::Version as HttpVersion,
    },
    log::debug,
    std::str::from_utf8,
};

const TEST_ACCESS_KEY: &str = "AKIDEXAMPLE";
const TEST_SECRET_KEY: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";
const TEST_REGION: &str = "us-east-1";
const TEST_SERVICE: &str = "service";

#[test_log::test]
fn get_vanilla() {
    run(
        "get-vanilla",
        "GET / HTTP/1.1\n\
         Host:example.amazonaws.com\n\
         X-Amz-Date:20150830T123600Z\n\
         \n\
         ",
        "host;x-amz-date",
        "bb579772317eb040ac9ed261061d46c1f17a8133879d6129b6e1c25292927e63",
        "5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31",
    );
}

#[test_log::test]
fn get_vanilla_empty_query_key() {
    run(
        "get-vanilla-empty-query-key",
        "GET /?Param1=value1 HTTP/1.1\n\
         Host:example.amazonaws.com\n\
         X-Amz-Date:20150830T123600Z\n\
         \n\
         ",
        "host;x-amz-date",
        "1e24db194ed7d0eec2de28d7369675a243488e08526e8c1c73571282f7c517ab",
        "a67d582fa61cc504c4bae71f336f98b97f1ea3c7a6bfe1b6e45aec72011b9aeb",
    );
}

#[test_log::test]
fn get_vanilla_query_order_key_case() {
    run(
        "get-vanilla-query-order-key-case",
        "GET /?Param2=value2&Param1=value1 HTTP/1.1\n\
         Host:example.amazonaws.com\n\
         X-Amz-Date:20150830T123600Z\n\
         \n\
         ",
        "host;x-amz-date",
        "816cd5b414d056048ba4f7c5386d6e0533120fb1fcfa93762cf0fc39e2cf19e0",
        "b97d918cfa904a5beff61c982a1b6f458b799221646efd99d3219ec94cdf2500",
    );
}

#[test_log::test]
fn get_vanilla_query_order_value() {
    run(
        "get-vanilla-query-order-value",
        "GET /?Param1=value2&Param1=Value1 HTTP/1.1\n\
         Host:example.amazonaws.com\n\
         X-Amz-Date:20150830T123600Z\n\
         \n\
         ",
        "host;x-amz-date",
        "704b4cef673542d84cdff252633f065e8daeba5f168b77116f8b1bcaf3d38f89",
        "eedbc4e291e521cf13422ffca22be7d2eb8146eecf653089df300a15b2382bd1",
    );
}

#[test_log::test]
fn get_vanilla_query_unreserved() {
    run(
        "get-vanilla-query-unreserved",
        "GET /?-._~0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz=-._~0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz HTTP/1.1\n\
         Host:example.amazonaws.com\n\
         X-Amz-Date:20150830T123600Z\n\
         \n\
         ",
        "host;x-amz-date",
        "c30d4703d9f799439be92736156d47ccfb2d879ddf56f5befa6d1d6aab979177",
        "9c3e54bfcdf0b19771a7f523ee5669cdf59bc7cc0884027167c21bb143a40197",
    );
}

#[test_log::test]
fn get_unreserved() {
    run(
        "get-unreserved",
        "GET /-._~0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz HTTP/1.1\n\
         Host:example.amazonaws.com\n\
         X-Amz-Date:20150830T123600Z\n\
         \n\
         ",
        "host;x-amz-date",
        "6a968768eefaa713e2a6b16b589a8ea192661f098f37349f4e2c0082757446f9",
        "07ef7494c76fa4850883e2b006601f940f8a34d404d0cfa977f52a65bbf5f24f",
    );
}

#[test_log::test]
fn get_utf8() {
    run(
        "get-utf8",
        "GET /%E1%88%B4 HTTP/1.1\n\
         Host:example.amazonaws.com\n\
         X-Amz-Date:20150830T123600Z\n\
         \n\
         ",
        "host;x-amz-date",
        "2a0a97d02205e45ce2e994789806b19270cfbbb0921b278ccf58f5249ac42102",
        "8318018e0b0f223aa2bbf98705b62bb787dc9c0e678f255a891fd03141be5d85",
    );
}

#[test_log::test]
fn get_relative() {
    run(
        "get-relative",
        "GET /example/.. HTTP/1.1\n\
         Host:example.amazonaws.com\n\
         X-Amz-Date:20150830T123600Z\n\
         \n\
         ",
        "host;x-amz-date",
        "bb579772317eb040ac9ed261061d46c1f17a8133879d6129b6e1c25292927e63",
        "5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31",
    );
}

#[test_log::test]
fn get_relative_relative() {
    run(
        "get-relative-relative",
        "GET /example1/example2/../.. HTTP/1.1\n\
         Host:example.amazonaws.com\n\
         X-Amz-Date:20150830T123600Z\n\
         \n\
         ",
        "host;x-amz-date",
        "bb579772317eb040ac9ed261061d46c1f17a8133879d6129b6e1c25292927e63",
        "5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31",
    );
}

#[test_log::test]
fn get_slash() {
    run(
        "get-slash",
        "GET // HTTP/1.1\n\
         Host:example.amazonaws.com\n\
         X-Amz-Date:20150830T123600Z\n\
         \n\
         ",
        "host;x-amz-date",
        "bb579772317eb040ac9ed261061d46c1f17a8133879d6129b6e1c25292927e63",
        "5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31",
    );
}

#[test_log::test]
fn get_slash_dot_slash() {
    run(
        "get-slash-dot-slash",
        "GET /./ HTTP/1.1\n\
         Host:example.amazonaws.com\n\
         X-Amz-Date:20150830T123600Z\n\
         \n\
         ",
        "host;x-amz-date",
        "bb579772317eb040ac9ed261061d46c1f17a8133879d6129b6e1c25292927e63",
        "5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31",
    );
}

#[test_log::test]
fn get_slash_pointless_dot() {
    run(
        "get-slash-pointless-dot",
        "GET /./example HTTP/1.1\n\
         Host:example.amazonaws.com\n\
         X-Amz-Date:20150830T123600Z\n\
         \n\
         ",
        "host;x-amz-date",
        "214d50c111a8edc4819da6a636336472c916b5240f51e9a51b5c3305180cf702",
        "ef75d96142cf21edca26f06005da7988e4f8dc83a165a80865db7089db637ec5",
    );
}

#[test_log::test]
fn get_slashes() {
    run(
        "get-slashes",
        "GET //example// HTTP/1.1\n\
         Host:example.amazonaws.com\n\
         X-Amz-Date:20150830T123600Z\n\
         \n\
         ",
        "host;x-amz-date",
        "cb96b4ac96d501f7c5c15bc6d67b3035061cfced4af6585ad927f7e6c985c015",
        "9a624bd73a37c9a373b5312afbebe7a714a789de108f0bdfe846570885f57e84",
    );
}

#[test_log::test]
fn get_space() {
    run(
        "get-space",
        "GET /example%20space/ HTTP/1.1\n\
         Host:example.amazonaws.com\n\
         X-Amz-Date:20150830T123600Z\n\
         \n\
         ",
        "host;x-amz-date",
        "63ee75631ed7234ae61b5f736dfc7754cdccfedbff4b5128a915706ee9390d86",
        "652487583200325589f1fba4c7e578f72c47cb61beeca81406b39ddec1366741",
    );
}

#[test_log::test]
fn post_vanilla() {
    run(
        "post-vanilla",
        "POST / HTTP/1.1\n\
         Host:example.amazonaws.com\n\
         X-Amz-Date:20150830T123600Z\n\
         \n\
         ",
        "host;x-amz-date",
        "553f88c9e4d10fc9e109e2aeb65f030801b70c2f6468faca261d401ae622fc87",
        "5da7c1a2acd57cee7505fc6676e4e544621c30862966e37dddb68e92efbe5d6b",
    );
}

#[test_log::test]
fn post_vanilla_query() {
    run(
        "post-vanilla-query",
        "POST /?Param1=value1 HTTP/1.1\n\
         Host:example.amazonaws.com\n\
         X-Amz-Date:20150830T123600Z\n\
         \n\
         ",
        "host;x-amz-date",
        "9d659678c1756bb3113e2ce898845a0a79dbbc57b740555917687f1b3340fbbd",
        "28038455d6de14eafc1f9222cf5aa6f1a96197d7deb8263271d420d138af7f11",
    );
}

#[test_log::test]
fn post_header_key_sort() {
    run(
        "post-header-key-sort",
        "POST / HTTP/1.1\n\
         Host:example.amazonaws.com\n\
         X-Amz-Date:20150830T123600Z\n\
         My-Header1:value1\n\
         \n\
         ",
        "host;my-header1;x-amz-date",
        "9368318c2967cf6de74404b30c65a91e8f6253e0a8659d6d5319f1a812f87d65",
        "c5410059b04c1ee005303aed430f6e6645f61f4dc9e1461ec8f8916fdf18852c",
    );
}

#[test_log::test]
fn post_header_value_case() {
    run(
        "post-header-value-case",
        "POST / HTTP/1.1\n\
         Host:example.amazonaws.com\n\
         X-Amz-Date:20150830T123600Z\n\
         My-Header1:VALUE1\n\
         \n\
         ",
        "host;my-header1;x-amz-date",
        "d51ced243e649e3de6ef63afbbdcbca03131a21a7103a1583706a64618606a93",
        "cdbc9802e29d2942e5e10b5bccfdd67c5f22c7c4e8ae67b53629efa58b974b7d",
    );
}

#[test_log::test]
fn post_x_www_form_urlencoded() {
    run(
        "post-x-www-form-urlencoded",
        "POST / HTTP/1.1\n\
         Content-Type:application/x-www-form-urlencoded\n\
         Host:example.amazonaws.com\n\
         X-Amz-Date:20150830T123600Z\n\
         \n\
         Param1=value1",
        "content-type;host;x-amz-date",
        "42a5e5bb34198acb3e84da4f085bb7927f2bc277ca766e6d19c73c2154021281",
        "ff11897932ad3f4e8b18135d722051e5ac45fc38421b1da7b9d196a0fe09473a",
    );
}

#[test_log::test]
fn post_sts_header_before() {
    run(
        "post-sts-header-before",
        "POST / HTTP/1.1\n\
         Host:example.amazonaws.com\n\
         X-Amz-Date:20150830T123600Z\n\
         X-Amz-Security-Token:AQoDYXdzEPT//////////wEXAMPLEtc764bNrC9SAPBSM22wDOk4x4HIZ8j4FZTwdQWLWsKWHGBuFqwAeMicRXmxfpSPfIeoIYRqTflfKD8YUuwthAx7mSEI/qkPpKPi/kMcGdQrmGdeehM4IC1NtBmUpp2wUE8phUZampKsburEDy0KPkyQDYwT7WZ0wq5VSXDvp75YU9HFvlRd8Tx6q6fE8YQcHNVXAkiY9q6d+xo0rKwT38xVqr7ZD0u0iPPkUL64lIZbqBAz+scqKmlzm8FDrypNC9Yjc8fPOLn9FX9KSYvKTr4rvx3iSIlTJabIQwj2ICCR/oLxBA==\n\
         \n\
         ",
        "host;x-amz-date;x-amz-security-token",
        "c237e1b440d4c63c32ca95b5b99481081cb7b13c7e40434868e71567c1a882f6",
        "85d96828115b5dc0cfc3bd16ad9e210dd772bbebba041836c64533a82be05ead",
    );
}

fn run(name: &str, raw: &str, signed_headers: &str, canonical_request_sha256: &str, signature: &str) {
    let request = parse_request(name, raw.as_bytes());
    let (parts, body) = request.into_parts();

    let cr = CanonicalRequest::new(&parts.method, &parts.uri, &parts.headers, body_sha256(&body))
        .unwrap_or_else(|e| panic!("Failed to canonicalize {name}: {e}"));
    debug!("Canonical request for {name}:\n{}", String::from_utf8_lossy(&cr.canonical_request()));

    assert_eq!(cr.signed_headers_string(), signed_headers, "Failed on {name}");
    assert_eq!(hex::encode(cr.canonical_request_sha256()), canonical_request_sha256, "Failed on {name}");

    let timestamp = request_timestamp(&parts.headers, &parts.uri).unwrap().expect("Fixture has no date");
    let signer = Signer::new(TEST_ACCESS_KEY, TEST_SECRET_KEY, TEST_REGION, TEST_SERVICE);

    let string_to_sign = signer.string_to_sign(&cr, &timestamp);
    let expected_string_to_sign = format!(
        "AWS4-HMAC-SHA256\n20150830T123600Z\n20150830/us-east-1/service/aws4_request\n{canonical_request_sha256}"
    );
    assert_eq!(from_utf8(&string_to_sign).unwrap(), expected_string_to_sign, "Failed on {name}");

    assert_eq!(signer.calculate_signature(&cr, &timestamp), signature, "Failed on {name}");
    assert_eq!(
        signer.authorization(&cr, &timestamp),
        format!(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request,\
             SignedHeaders={signed_headers},Signature={signature}"
        ),
        "Failed on {name}"
    );
}

/// Parse a raw HTTP/1.1 request in the test-suite `.req` format. Header lines starting with whitespace continue the
/// previous header.
#[allow(clippy::expect_fun_call)]
fn parse_request(name: &str, raw: &[u8]) -> Request<Bytes> {
    let (head, body) = match raw.windows(2).position(|w| w == b"\n\n") {
        Some(pos) => (&raw[..pos], &raw[pos + 2..]),
        None => (raw, &b""[..]),
    };

    let mut lines = head.split(|c| *c == b'\n');
    let method_line = lines.next().expect(&format!("No method line in {name}"));
    let method_line_str = String::from_utf8_lossy(method_line).to_string();

    let mut muq_and_ver = method_line.rsplitn(2, |c| *c == b' '); // muq = method uri query
    let ver = muq_and_ver.next().expect(&format!("No version in {method_line_str}"));
    let muq = muq_and_ver.next().expect(&format!("No method/uri/query in {method_line_str}"));

    let mut muq_parts = muq.splitn(2, |c| *c == b' ');
    let method = muq_parts.next().expect(&format!("No method in {method_line_str}"));
    let method = Method::from_bytes(method).expect(&format!("Invalid method in {method_line_str}"));
    let path_query = muq_parts.next().expect(&format!("No path/query in {method_line_str}"));
    let pq = PathAndQuery::try_from(path_query).expect(&format!("Invalid path/query in {method_line_str}"));

    let mut builder = Request::builder().version(parse_http_version(ver)).method(method).uri(Uri::from(pq));

    let mut current: Option<(String, Vec<u8>)> = None;
    for line in lines {
        if line.starts_with(b" ") || line.starts_with(b"\t") {
            // Continuation of previous header.
            let (key, mut value) = current.take().expect(&format!("Continuation with no header in {name}"));
            value.push(b' ');
            value.extend_from_slice(line.trim_ascii());
            current = Some((key, value));
        } else {
            if let Some((key, value)) = current.take() {
                builder = builder.header(key, HeaderValue::from_bytes(&value).unwrap());
            }

            let line = from_utf8(line).unwrap();
            let (key, value) = line.split_once(':').expect(&format!("Malformed header line {line:?} in {name}"));
            current = Some((key.to_string(), value.trim().as_bytes().to_vec()));
        }
    }

    if let Some((key, value)) = current {
        builder = builder.header(key, HeaderValue::from_bytes(&value).unwrap());
    }

    builder.body(Bytes::copy_from_slice(body)).expect("Failed to build request")
}

fn parse_http_version(ver: &[u8]) -> HttpVersion {
    match ver {
        b"HTTP/1.0" => HttpVersion::HTTP_10,
        b"HTTP/1.1" => HttpVersion::HTTP_11,
        b"HTTP/2.0" => HttpVersion::HTTP_2,
        _ => panic!("Unknown HTTP version: {}", String::from_utf8_lossy(ver)),
    }
}

#[test_log::test]
fn parse_continuation() {
    let raw = b"GET / HTTP/1.1\nHost:example.amazonaws.com\nMy-Header: a\n  b\n\nbody";
    let request = parse_request("continuation", raw);
    assert_eq!(request.headers().get("my-header").unwrap(), "a b");
    assert_eq!(request.body().as_ref(), b"body");
}
