use std::time::Duration;

use cyclegrid_client::{ClientConfig, CycleSource, FetchError, HttpSource};
use cyclegrid_core::{AddressingMode, RequestKey};

#[test]
fn unreachable_service_is_a_transport_error() {
    let config = ClientConfig::default()
        .with_api_base(Some("http://127.0.0.1:1".to_string()), None)
        .with_timeout(Duration::from_secs(2));
    let source = HttpSource::new(&config).expect("client");
    assert_eq!(source.describe(), "http://127.0.0.1:1/cycles");

    let err = source
        .fetch(RequestKey::new(4, AddressingMode::ZeroBased))
        .unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)), "{err}");
    assert!(err.is_transient());
}
