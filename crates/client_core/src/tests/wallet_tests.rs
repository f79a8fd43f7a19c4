use super::*;
use shared::domain::AccountId;

#[tokio::test]
async fn missing_provider_refuses_every_capability() {
    let provider = MissingWalletProvider;

    assert!(provider.restore_session().await.is_err());
    assert!(provider.request_sign_in().await.is_err());
    assert!(provider.sign_out().await.is_err());

    let err = provider
        .deploy_contract(
            &AccountId("alice.testnet".to_string()),
            "counter-1.alice.testnet",
            b"\0asm",
        )
        .await
        .expect_err("must fail");
    assert!(err.to_string().contains("counter-1.alice.testnet"));
}

#[tokio::test]
async fn client_with_missing_provider_stays_in_compile_only_mode() {
    let client = crate::StudioClient::new("http://127.0.0.1:1");

    let err = client
        .initialize_wallet()
        .await
        .expect_err("restore must fail");
    assert!(err.to_string().contains("initialization failed"));

    let session = client.session().await;
    assert!(!session.wallet.signed_in());
    assert!(!session.wallet_ready);

    // Connect without an initialized provider is a no-op, not an error.
    client.connect_wallet().await.expect("noop");
}
