use handoff_core::error::CredentialError;
use handoff_core::store::client_credentials::NO_EXPIRATION;
use handoff_core::store::{
    ClientCredentialStorage, ClientCredentials, ClientIdentityStorage, DataSource,
    MemoryDataSource,
};
use handoff_core::transport::CredentialSource;

use common::RedactedSecret;

use std::sync::Arc;

use url::Url;

fn gateway(url: &str) -> Option<Url> {
    Some(Url::parse(url).expect("valid gateway URL"))
}

fn credentials() -> ClientCredentials {
    ClientCredentials {
        master_client_id: "master-1".to_string(),
        client_id: "client-1".to_string(),
        client_secret: RedactedSecret::new("s3cr3t"),
        client_expiration: 1_900_000_000,
    }
}

/// **VALUE**: Verifies that saved client credentials read back field by field.
///
/// **BUG THIS CATCHES**: Would catch two fields sharing a key, or the expiration being
/// stored in a form that does not parse back.
#[test]
fn given_saved_credentials_when_read_then_each_field_returned() {
    // GIVEN: Credentials saved against a gateway
    let source = Arc::new(MemoryDataSource::new());
    let storage = ClientCredentialStorage::new(source, gateway("https://gw.example"));
    storage
        .save_client_credentials(&credentials())
        .expect("saves");

    // WHEN / THEN: Every field reads back
    assert_eq!(storage.master_client_id().expect("reads").as_deref(), Some("master-1"));
    assert_eq!(storage.client_id().expect("reads").as_deref(), Some("client-1"));
    assert_eq!(
        storage.client_secret().expect("reads").map(|s| s.expose().to_string()),
        Some("s3cr3t".to_string())
    );
    assert_eq!(storage.client_expiration().expect("reads"), 1_900_000_000);
}

#[test]
fn given_nothing_saved_when_expiration_read_then_no_expiration() {
    let storage = ClientCredentialStorage::new(
        Arc::new(MemoryDataSource::new()),
        gateway("https://gw.example"),
    );

    assert_eq!(storage.client_expiration().expect("reads"), NO_EXPIRATION);
    assert_eq!(storage.client_id().expect("reads"), None);
}

/// **VALUE**: Verifies that `clear()` only removes this store's keys for this gateway.
///
/// **WHY THIS MATTERS**: Other stores share the data source. De-registering one client must
/// not wipe an identity enrolled for a different gateway.
///
/// **BUG THIS CATCHES**: Would catch `clear()` delegating to `remove_all()`.
#[test]
fn given_two_gateways_when_one_cleared_then_other_untouched() {
    // GIVEN: Credentials for two gateways in one data source
    let source = Arc::new(MemoryDataSource::new());
    let first = ClientCredentialStorage::new(source.clone(), gateway("https://one.example"));
    let second = ClientCredentialStorage::new(source.clone(), gateway("https://two.example"));
    first.save_client_credentials(&credentials()).expect("saves");
    second.save_client_credentials(&credentials()).expect("saves");

    // WHEN: Clearing the first
    first.clear().expect("clears");

    // THEN: Only the first is gone
    assert_eq!(first.client_id().expect("reads"), None);
    assert_eq!(second.client_id().expect("reads").as_deref(), Some("client-1"));
    assert_eq!(source.len(), 4);

    // WHEN: Clearing everything
    second.clear_all().expect("clears");

    // THEN: The source is empty
    assert!(source.is_empty());
}

#[test]
fn given_no_gateway_when_accessed_then_not_initialized() {
    let storage = ClientCredentialStorage::new(Arc::new(MemoryDataSource::new()), None);

    let result = storage.client_id();

    assert!(matches!(result, Err(CredentialError::NotInitialized { .. })));
}

#[test]
fn given_empty_identity_store_when_identity_requested_then_none() {
    let storage = ClientIdentityStorage::new(
        Arc::new(MemoryDataSource::new()),
        gateway("https://gw.example"),
    );

    let identity = storage.client_identity().expect("reads");

    assert!(identity.is_none());
}

/// **VALUE**: Verifies that a stored PEM identity is returned ready for the TLS factory.
///
/// **BUG THIS CATCHES**: Would catch the chain and key being stored under swapped keys, or
/// the PEM being mangled on the way through the data source.
#[test]
fn given_stored_identity_when_requested_then_parsed_key_and_chain() {
    // GIVEN: A stored key and certificate
    let generated = rcgen::generate_simple_self_signed(vec!["client".to_string()]).expect("rcgen");
    let storage = ClientIdentityStorage::new(
        Arc::new(MemoryDataSource::new()),
        gateway("https://gw.example"),
    );
    storage
        .save_identity(
            &RedactedSecret::new(generated.key_pair.serialize_pem()),
            &generated.cert.pem(),
        )
        .expect("saves");

    // WHEN: Reading it as a credential source
    let identity = storage
        .client_identity()
        .expect("reads")
        .expect("identity stored");

    // THEN: The chain is the stored certificate
    assert_eq!(identity.certificate_chain().len(), 1);
    assert_eq!(
        identity.certificate_chain()[0].as_ref(),
        generated.cert.der().as_ref()
    );
}

#[test]
fn given_corrupt_identity_when_requested_then_decode_error() {
    let source = Arc::new(MemoryDataSource::new());
    let storage = ClientIdentityStorage::new(source, gateway("https://gw.example"));
    storage
        .save_identity(&RedactedSecret::new("not a key"), "not a chain")
        .expect("saves");

    let result = storage.client_identity();

    assert!(matches!(result, Err(CredentialError::Decode { .. })));
}

#[test]
fn given_memory_source_when_key_removed_then_get_returns_none() {
    let source = MemoryDataSource::new();
    source.put("k", "v").expect("puts");

    source.remove("k").expect("removes");

    assert_eq!(source.get("k").expect("gets"), None);
}
