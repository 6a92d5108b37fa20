use crate::store::scoped_key;

use url::Url;

/// **VALUE**: Verifies that keys are namespaced by the connected gateway.
///
/// **WHY THIS MATTERS**: One data source can hold enrolments for several gateways.
/// Without the prefix, enrolling against a second gateway overwrites the first.
///
/// **BUG THIS CATCHES**: Would catch a key builder that drops the gateway prefix.
#[test]
fn given_gateway_when_key_scoped_then_prefixed_with_gateway_url() {
    // GIVEN: A connected gateway
    let gateway = Url::parse("https://gw.example:8443").expect("valid URL");

    // WHEN: Scoping a key
    let key = scoped_key(Some(&gateway), "PREF_CLIENT_ID").expect("scoped");

    // THEN: The gateway URL is the prefix
    assert_eq!(key, "https://gw.example:8443/PREF_CLIENT_ID");
}

#[test]
fn given_no_gateway_when_key_scoped_then_not_initialized() {
    let result = scoped_key(None, "PREF_CLIENT_ID");

    assert!(result.is_err_and(|e| e.is_not_initialized()));
}
