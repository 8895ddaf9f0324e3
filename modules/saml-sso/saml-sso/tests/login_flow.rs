#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Login and logout interception through the full router.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use saml_sso::domain::ConfigSubmission;
use saml_sso::host::FlashLevel;
use saml_sso_sdk::IdentityAssertion;

use common::{Harness, IDP, IDP_COOKIE, get_with_idp_session, json_body, location, uid};

#[tokio::test]
async fn unconfigured_login_is_left_to_the_host() {
    let h = Harness::new().await;

    let resp = h.send(get_with_idp_session("/users/login", None)).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(json_body(resp).await["view"].is_null());
}

#[tokio::test]
async fn matched_session_signs_in_and_forwards_cookies() {
    let h = Harness::new().await;
    h.configure(h.submission()).await;
    let jdoe = h.account("jdoe", "jdoe@example.edu", true);
    h.open_idp_session("s1", uid(&["jdoe"]));

    let resp = h.send(get_with_idp_session("/users/login", Some("s1"))).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin");
    assert_eq!(
        resp.headers().get(header::SET_COOKIE).unwrap(),
        common::HOST_COOKIE
    );
    assert_eq!(h.session.sign_ins(), vec![jdoe.id]);
}

#[tokio::test]
async fn formatted_email_match_signs_in() {
    let h = Harness::new().await;
    h.configure(ConfigSubmission {
        format: Some("%s@bgsu.edu".to_owned()),
        match_email: Some(true),
        ..h.submission()
    })
    .await;
    let bob = h.account("robert", "bob@bgsu.edu", true);
    h.open_idp_session("s1", uid(&["bob"]));

    let resp = h.send(get_with_idp_session("/users/login", Some("s1"))).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(h.session.sign_ins(), vec![bob.id]);
}

#[tokio::test]
async fn second_value_can_win() {
    let h = Harness::new().await;
    h.configure(h.submission()).await;
    let bob = h.account("bob", "bob@example.edu", true);
    h.open_idp_session("s1", uid(&["x", "bob"]));

    let resp = h.send(get_with_idp_session("/users/login", Some("s1"))).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(h.session.sign_ins(), vec![bob.id]);
}

#[tokio::test]
async fn inactive_account_shows_not_found_on_login_page() {
    let h = Harness::new().await;
    h.configure(ConfigSubmission {
        format: Some("%s@bgsu.edu".to_owned()),
        match_email: Some(true),
        plugin_title: Some("University Login".to_owned()),
        ..h.submission()
    })
    .await;
    h.account("bob", "bob@bgsu.edu", false);
    h.open_idp_session("s1", uid(&["bob"]));

    let resp = h.send(get_with_idp_session("/users/login", Some("s1"))).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let view = json_body(resp).await["view"].clone();
    assert_eq!(
        view["messages"][0]["text"],
        "Email matching \"bob@bgsu.edu\" not found."
    );
    assert_eq!(view["messages"][0]["level"], "error");
    assert_eq!(view["plugin_title"], "University Login");
    assert_eq!(view["button_label"], "Single Sign-On Log In");
    let login_url = view["login_url"].as_str().unwrap();
    assert!(login_url.starts_with(&format!("{IDP}login?AuthId=default-sp&ReturnTo=")));
    assert!(login_url.contains("site.example.edu%2Fusers%2Flogin"));
    assert!(h.session.sign_ins().is_empty());
}

#[tokio::test]
async fn anonymous_visitor_sees_button_without_errors() {
    let h = Harness::new().await;
    h.configure(h.submission()).await;

    let resp = h.send(get_with_idp_session("/users/login", None)).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let view = json_body(resp).await["view"].clone();
    assert!(view["login_url"].is_string());
    assert_eq!(view["messages"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn authenticated_session_without_attribute_reports_ambiguity() {
    let h = Harness::new().await;
    h.configure(h.submission()).await;
    h.open_idp_session(
        "s1",
        IdentityAssertion::new().with("mail", vec!["jdoe@example.edu".to_owned()]),
    );

    let resp = h.send(get_with_idp_session("/users/login", Some("s1"))).await;

    let view = json_body(resp).await["view"].clone();
    assert_eq!(
        view["messages"][0]["text"],
        "The identity provider did not supply the \"uid\" attribute."
    );
}

#[tokio::test]
async fn required_sso_redirects_to_provider_and_flashes_failure() {
    let h = Harness::new().await;
    h.configure(ConfigSubmission {
        required: Some(true),
        ..h.submission()
    })
    .await;
    h.open_idp_session("s1", uid(&["nobody"]));

    let resp = h.send(get_with_idp_session("/users/login", Some("s1"))).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(location(&resp).starts_with(&format!("{IDP}login?")));
    let flashes = h.session.flashes();
    assert_eq!(flashes.len(), 1);
    assert_eq!(flashes[0].level, FlashLevel::Error);
    assert_eq!(flashes[0].text, "Username matching \"nobody\" not found.");
}

#[tokio::test]
async fn required_sso_redirects_anonymous_visitor_silently() {
    let h = Harness::new().await;
    h.configure(ConfigSubmission {
        required: Some(true),
        ..h.submission()
    })
    .await;

    let resp = h.send(get_with_idp_session("/users/login", None)).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(h.session.flashes().is_empty());
}

#[tokio::test]
async fn local_login_submit_is_never_intercepted() {
    let h = Harness::new().await;
    h.configure(ConfigSubmission {
        required: Some(true),
        ..h.submission()
    })
    .await;
    h.account("jdoe", "jdoe@example.edu", true);
    h.open_idp_session("s1", uid(&["jdoe"]));

    let form = "username=jdoe&password=secret&submit=Log+In";
    let resp = h
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/users/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header(header::COOKIE, format!("{IDP_COOKIE}=s1"))
                .body(Body::from(form))
                .unwrap(),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["local"], true);
    assert_eq!(body["body"], form);
    assert!(body["view"].is_null());
    assert!(h.session.sign_ins().is_empty());
}

#[tokio::test]
async fn post_without_submit_is_still_intercepted() {
    let h = Harness::new().await;
    h.configure(h.submission()).await;
    h.account("jdoe", "jdoe@example.edu", true);
    h.open_idp_session("s1", uid(&["jdoe"]));

    let resp = h
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/users/login")
                .header(header::COOKIE, format!("{IDP_COOKIE}=s1"))
                .body(Body::from("SAMLResponse=abc"))
                .unwrap(),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(h.session.sign_ins().len(), 1);
}

#[tokio::test]
async fn logout_with_provider_session_redirects_to_single_logout() {
    let h = Harness::new().await;
    h.configure(ConfigSubmission {
        logout_url: Some("/goodbye".to_owned()),
        ..h.submission()
    })
    .await;
    h.open_idp_session("s1", uid(&["jdoe"]));

    let resp = h.send(get_with_idp_session("/users/logout", Some("s1"))).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let target = location(&resp);
    assert!(target.starts_with(&format!("{IDP}logout?AuthId=default-sp")));
    assert!(target.contains("ReturnTo=https%3A%2F%2Fsite.example.edu%2Fgoodbye"));
    assert_eq!(
        resp.headers().get(header::SET_COOKIE).unwrap(),
        "host_session=; Max-Age=0; Path=/"
    );
    assert!(h.plugin.sessions().is_empty());
}

#[tokio::test]
async fn logout_without_provider_session_keeps_host_response() {
    let h = Harness::new().await;
    h.configure(h.submission()).await;

    let resp = h.send(get_with_idp_session("/users/logout", Some("unknown"))).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn unconfigured_logout_keeps_host_response() {
    let h = Harness::new().await;
    h.open_idp_session("s1", uid(&["jdoe"]));

    let resp = h.send(get_with_idp_session("/users/logout", Some("s1"))).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(h.plugin.sessions().len(), 1);
}

#[tokio::test]
async fn other_host_routes_are_untouched() {
    let h = Harness::new().await;
    h.configure(ConfigSubmission {
        required: Some(true),
        ..h.submission()
    })
    .await;

    let resp = h.send(get_with_idp_session("/", None)).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[test]
fn login_routes_are_public() {
    let routes = saml_sso::api::rest::routes::public_routes();

    assert_eq!(
        routes,
        vec![(Method::GET, "/users/login"), (Method::POST, "/users/login")]
    );
}
