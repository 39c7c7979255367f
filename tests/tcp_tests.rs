//! TCP Transport Tests
//!
//! Runs the client against a minimal in-test server speaking the wire
//! protocol over a real socket, backed by the loopback service.

use std::io::{BufReader, BufWriter};
use std::net::{TcpListener, TcpStream};
use std::thread;

use stratakv::protocol::{read_request, write_response};
use stratakv::transport::LoopbackService;
use stratakv::{Client, Condition, Config, StrataError};

/// Route client log output through RUST_LOG when debugging these tests
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Serve one client connection until it disconnects
fn serve_connection(stream: TcpStream, service: LoopbackService) {
    stream.set_nodelay(true).unwrap();
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut writer = BufWriter::new(stream);

    loop {
        let request = match read_request(&mut reader) {
            Ok(request) => request,
            // Client closed the connection
            Err(_) => return,
        };
        let response = service.handle(&request);
        write_response(&mut writer, &response).unwrap();
    }
}

/// Start a server on an ephemeral port; returns its locator
fn spawn_server(service: LoopbackService) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(_) => return,
            };
            let service = service.clone();
            thread::spawn(move || serve_connection(stream, service));
        }
    });

    format!("tcp:host=127.0.0.1,port={}", port)
}

// =============================================================================
// End-to-End Tests
// =============================================================================

#[test]
fn test_object_lifecycle_over_tcp() {
    init_tracing();
    let locator = spawn_server(LoopbackService::new());
    let mut client = Client::connect(&locator).unwrap();

    client.create_table("t").unwrap();
    let t = client.open_table("t").unwrap();

    assert_eq!(client.create(t, 0, b"Hello").unwrap(), 1);

    let (value, version) = client.read(t, 0, Condition::RequireExists).unwrap();
    assert_eq!(value, b"Hello");
    assert_eq!(version, 1);

    assert_eq!(
        client.update(t, 0, b"Bye", Condition::RequireExists).unwrap(),
        2
    );
    client.delete(t, 0, Condition::RequireExists).unwrap();
    assert!(matches!(
        client.read(t, 0, Condition::RequireExists),
        Err(StrataError::ObjectDoesNotExist)
    ));

    client.disconnect();
}

#[test]
fn test_binary_values_survive_the_socket() {
    let locator = spawn_server(LoopbackService::new());
    let mut client = Client::connect(&locator).unwrap();

    client.create_table("t").unwrap();
    let t = client.open_table("t").unwrap();

    let value: Vec<u8> = (0u8..=255).cycle().take(100_000).collect();
    client.create(t, 1, &value).unwrap();

    let (read_back, _) = client.read(t, 1, Condition::RequireExists).unwrap();
    assert_eq!(read_back, value);
}

#[test]
fn test_version_conflict_detail_over_tcp() {
    let locator = spawn_server(LoopbackService::new());
    let mut client = Client::connect(&locator).unwrap();

    client.create_table("t").unwrap();
    let t = client.open_table("t").unwrap();

    client.write(t, 7, b"x", Condition::Unconditional).unwrap();
    client.write(t, 7, b"y", Condition::RequireVersion(1)).unwrap();

    match client.write(t, 7, b"z", Condition::RequireVersion(1)) {
        Err(StrataError::VersionConflict {
            requested,
            observed,
        }) => {
            assert_eq!(requested, 1);
            assert_eq!(observed, 2);
        }
        other => panic!("expected version conflict, got {:?}", other),
    }
}

#[test]
fn test_two_connections_one_cluster() {
    let service = LoopbackService::new();
    let locator = spawn_server(service);

    let mut first = Client::connect(&locator).unwrap();
    first.create_table("shared").unwrap();
    let t = first.open_table("shared").unwrap();
    first.create(t, 1, b"from-first").unwrap();

    let mut second = Client::connect(&locator).unwrap();
    let t = second.open_table("shared").unwrap();
    let (value, _) = second.read(t, 1, Condition::RequireExists).unwrap();
    assert_eq!(value, b"from-first");
}

// =============================================================================
// Connection Failure Tests
// =============================================================================

#[test]
fn test_malformed_locator_is_a_connection_error() {
    for locator in [
        "fast+udp:host=127.0.0.1,port=12242",
        "tcp:port=12242",
        "tcp:host=127.0.0.1",
        "tcp:host=127.0.0.1,port=not-a-port",
        "tcp:gibberish",
    ] {
        match Client::connect(locator) {
            Err(StrataError::Connection(_)) => {}
            other => panic!("locator {:?} gave {:?}", locator, other.map(|_| ())),
        }
    }
}

#[test]
fn test_connect_uses_the_configured_locator() {
    let locator = spawn_server(LoopbackService::new());
    let config = Config::builder().locator(&locator).build();

    let mut client = Client::connect_with_config(config).unwrap();
    assert_eq!(client.config().locator, locator);

    client.create_table("t").unwrap();
    let t = client.open_table("t").unwrap();
    assert_eq!(client.create(t, 1, b"v").unwrap(), 1);
}

#[test]
fn test_unreachable_service_is_a_connection_error() {
    // Port 1 is essentially never listening on loopback
    let config = Config::builder()
        .locator("tcp:host=127.0.0.1,port=1")
        .connect_timeout(std::time::Duration::from_millis(200))
        .build();
    let result = Client::connect_with_config(config);
    assert!(matches!(result, Err(StrataError::Connection(_))));
}
