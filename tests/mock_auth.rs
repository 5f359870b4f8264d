use mockito::{mock, Matcher};

use dktoken::errors::Error;

fn client(user: &str, password: &str) -> dktoken::v2::Client {
    dktoken::v2::Client::configure()
        .username(Some(user.to_string()))
        .password(Some(password.to_string()))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_full_authentication_flow() {
    let tags = r#"{"name": "flow/repo", "tags": [ "t1", "t2" ]}"#;
    let resource = "/v2/flow/repo/tags/list";
    let challenge = format!(
        r#"Bearer realm="{}/token/flow",service="registry.example",scope="repository:flow/repo:pull""#,
        mockito::server_url()
    );

    let _m_challenge = mock("GET", resource)
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_header("www-authenticate", &challenge)
        .create();
    // Basic credentials for user:secret.
    let m_token = mock("GET", "/token/flow")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("service".into(), "registry.example".into()),
            Matcher::UrlEncoded("scope".into(), "repository:flow/repo:pull".into()),
        ]))
        .match_header("authorization", "Basic dXNlcjpzZWNyZXQ=")
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"token": "abc123"}"#)
        .create();
    let m_retry = mock("GET", resource)
        .match_header("authorization", "Bearer abc123")
        .with_header("Content-Type", "application/json")
        .with_body(tags)
        .create();

    // Same user:secret pair, read from a docker-style config.
    let docker_config =
        r#"{"auths": {"registry.example": {"auth": "dXNlcjpzZWNyZXQ="}}}"#;
    let authed = dktoken::v2::Client::configure()
        .read_credentials(docker_config.as_bytes(), "registry.example")
        .build()
        .unwrap();

    let url = format!("{}{}", mockito::server_url(), resource);
    let body = authed.authenticate_and_fetch(&url).await.unwrap();

    assert_eq!(body, tags);
    m_token.assert();
    m_retry.assert();
}

#[tokio::test]
async fn test_missing_token_aborts_retry() {
    let resource = "/v2/notoken/repo/tags/list";
    let challenge = format!(
        r#"Bearer realm="{}/token/notoken",service="registry.example",scope="repository:notoken/repo:pull""#,
        mockito::server_url()
    );

    let _m_challenge = mock("GET", resource)
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_header("www-authenticate", &challenge)
        .create();
    let _m_token = mock("GET", "/token/notoken")
        .match_query(Matcher::Any)
        .with_header("Content-Type", "application/json")
        .with_body("{}")
        .create();
    let m_retry = mock("GET", resource)
        .match_header("authorization", Matcher::Regex("^Bearer".into()))
        .expect(0)
        .create();

    let url = format!("{}{}", mockito::server_url(), resource);
    let res = client("user", "secret").authenticate_and_fetch(&url).await;

    assert!(matches!(res, Err(Error::MissingToken)));
    m_retry.assert();
}

#[tokio::test]
async fn test_missing_challenge_header() {
    let resource = "/v2/public/repo/tags/list";
    let _m = mock("GET", resource)
        .with_status(200)
        .with_body(r#"{"name": "public/repo", "tags": [ "t1" ]}"#)
        .create();

    let url = format!("{}{}", mockito::server_url(), resource);
    let res = client("user", "secret").authenticate_and_fetch(&url).await;

    assert!(matches!(res, Err(Error::MissingChallenge)));
}

#[tokio::test]
async fn test_undecodable_token_body() {
    let resource = "/v2/garbled/repo/tags/list";
    let challenge = format!(
        r#"Bearer realm="{}/token/garbled",service="registry.example",scope="repository:garbled/repo:pull""#,
        mockito::server_url()
    );

    let _m_challenge = mock("GET", resource)
        .with_status(401)
        .with_header("www-authenticate", &challenge)
        .create();
    let _m_token = mock("GET", "/token/garbled")
        .match_query(Matcher::Any)
        .with_body("not json")
        .create();

    let url = format!("{}{}", mockito::server_url(), resource);
    let res = client("user", "secret").authenticate_and_fetch(&url).await;

    assert!(matches!(res, Err(Error::Decode(_))));
}

#[tokio::test]
async fn test_anonymous_exchange() {
    let resource = "/v2/anon/repo/tags/list";
    let challenge = format!(
        r#"Bearer realm="{}/token/anon",service="registry.example",scope="repository:anon/repo:pull""#,
        mockito::server_url()
    );

    let _m_challenge = mock("GET", resource)
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_header("www-authenticate", &challenge)
        .create();
    // No credentials configured, so no Basic header on the exchange.
    let m_token = mock("GET", "/token/anon")
        .match_query(Matcher::Any)
        .match_header("authorization", Matcher::Missing)
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"token": "anon456"}"#)
        .create();
    let _m_retry = mock("GET", resource)
        .match_header("authorization", "Bearer anon456")
        .with_body("{}")
        .create();

    let anon = dktoken::v2::Client::configure().build().unwrap();
    let url = format!("{}{}", mockito::server_url(), resource);
    let body = anon.authenticate_and_fetch(&url).await.unwrap();

    assert_eq!(body, "{}");
    m_token.assert();
}

#[tokio::test]
async fn test_get_tags() {
    let resource = "/v2/typed/repo/tags/list";
    let challenge = format!(
        r#"Bearer realm="{}/token/typed",service="registry.example",scope="repository:typed/repo:pull""#,
        mockito::server_url()
    );

    let _m_challenge = mock("GET", resource)
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_header("www-authenticate", &challenge)
        .create();
    let _m_token = mock("GET", "/token/typed")
        .match_query(Matcher::Any)
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"token": "typed789"}"#)
        .create();
    let _m_retry = mock("GET", resource)
        .match_header("authorization", "Bearer typed789")
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"name": "typed/repo", "tags": [ "t1", "t2" ]}"#)
        .create();

    let url = format!("{}{}", mockito::server_url(), resource);
    let tags = client("user", "secret").get_tags(&url).await.unwrap();

    assert_eq!(tags.name(), "typed/repo");
    assert_eq!(tags.tags(), ["t1", "t2"]);
}

#[tokio::test]
async fn test_retry_failure_is_reported() {
    let resource = "/v2/denied/repo/tags/list";
    let challenge = format!(
        r#"Bearer realm="{}/token/denied",service="registry.example",scope="repository:denied/repo:pull""#,
        mockito::server_url()
    );

    let _m_challenge = mock("GET", resource)
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_header("www-authenticate", &challenge)
        .create();
    let _m_token = mock("GET", "/token/denied")
        .match_query(Matcher::Any)
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"token": "denied000"}"#)
        .create();
    let _m_retry = mock("GET", resource)
        .match_header("authorization", "Bearer denied000")
        .with_status(403)
        .create();

    let url = format!("{}{}", mockito::server_url(), resource);
    let res = client("user", "secret").authenticate_and_fetch(&url).await;

    match res {
        Err(Error::UnexpectedHttpStatus(step, status)) => {
            assert_eq!(format!("{}", step), "authenticated retry");
            assert_eq!(status.as_u16(), 403);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}
