//! Platform configuration and end-to-end receiver behaviour

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use eiscp_client::{encode, FrameDecoder};
use onkyo_sdk::{
    Catalog, ConfigError, OnkyoPlatform, PlatformConfig, ReceiverConfig, SdkError,
    TransportConfig, Zone, PLATFORM_NAME,
};
use tempfile::NamedTempFile;

const HOMEBRIDGE_CONFIG: &str = r#"{
  "bridge": { "name": "Homebridge", "port": 51826 },
  "platforms": [
    { "platform": "config", "name": "Config" },
    {
      "platform": "Onkyo",
      "receivers": [
        { "name": "Living Room", "ip_address": "192.168.1.40", "model": "TX-NR686", "zone": "main" },
        { "name": "Patio", "ip_address": "192.168.1.40", "model": "TX-NR686", "zone": "zone2",
          "avrManufacturer": "Onkyo", "avrSerial": "0009B0ABCDEF" }
      ]
    }
  ]
}"#;

// ============================================================================
// Test Helpers
// ============================================================================

fn reply(message: &str) -> Option<&'static str> {
    match message {
        "PWRQSTN" => Some("PWR01"),
        "MVLQSTN" => Some("MVL14"),
        "AMTQSTN" => Some("AMT00"),
        "SLIQSTN" => Some("SLI01"),
        "MVL2A" => Some("MVL2A"),
        "AMT01" => Some("AMTN/A"),
        _ => None,
    }
}

fn serve(mut stream: TcpStream, seen: mpsc::Sender<String>) {
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .unwrap();
    let mut decoder = FrameDecoder::new();
    let mut buf = [0u8; 1024];

    loop {
        let n = match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        decoder.push(&buf[..n]);

        while let Some(message) = decoder.next_frame().unwrap() {
            let body = message.as_str().to_string();
            if let Some(answer) = reply(&body) {
                if stream.write_all(&encode(answer)).is_err() {
                    return;
                }
            }
            let _ = seen.send(body);
        }
    }
}

/// Route worker logs to the test harness; `RUST_LOG` controls the level
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

fn spawn_fake_receiver() -> (u16, mpsc::Receiver<String>) {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let (seen_tx, seen_rx) = mpsc::channel();

    thread::spawn(move || {
        if let Ok((stream, _)) = listener.accept() {
            serve(stream, seen_tx);
        }
    });

    (port, seen_rx)
}

fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_homebridge_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(HOMEBRIDGE_CONFIG.as_bytes()).unwrap();

    let config = PlatformConfig::from_homebridge_path(file.path()).unwrap();
    assert_eq!(config.platform, PLATFORM_NAME);

    let descriptors = config.descriptors().unwrap();
    assert_eq!(descriptors.len(), 2);
    assert_eq!(descriptors[0].name, "Living Room");
    assert_eq!(descriptors[0].zone, Zone::Main);
    assert_eq!(descriptors[1].zone, Zone::Zone2);
    assert_eq!(descriptors[1].serial.as_deref(), Some("0009B0ABCDEF"));
}

#[test]
fn test_missing_platform_block() {
    let result = PlatformConfig::from_homebridge_json(r#"{ "platforms": [] }"#);
    assert!(matches!(result, Err(ConfigError::PlatformNotFound(name)) if name == "Onkyo"));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let result = PlatformConfig::from_homebridge_path(&path);
    assert!(matches!(result, Err(ConfigError::Io { path: p, .. }) if p == path));
}

#[test]
fn test_invalid_entry_stops_platform_start() {
    let config = PlatformConfig::new()
        .with_receiver(ReceiverConfig::new("Den", "127.0.0.1", "TX-NR474"))
        .with_receiver(ReceiverConfig::new("", "127.0.0.1", "TX-NR474"));

    let result = OnkyoPlatform::with_catalog(
        &config,
        Arc::new(Catalog::load().unwrap()),
        TransportConfig::default(),
    );

    assert!(matches!(
        result,
        Err(SdkError::Config(ConfigError::MissingName { index: 1 }))
    ));
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn test_receiver_against_fake_device() {
    let (port, seen) = spawn_fake_receiver();
    let config = PlatformConfig::new()
        .with_receiver(ReceiverConfig::new("Living Room", "127.0.0.1", "TX-NR686").with_port(port));

    let platform = OnkyoPlatform::with_catalog(
        &config,
        Arc::new(Catalog::load().unwrap()),
        TransportConfig::default().with_command_timeout(Duration::from_millis(500)),
    )
    .unwrap();
    let receiver = platform.require_receiver("Living Room").unwrap();
    assert!(platform.receiver("Kitchen").is_none());

    // Initial queries fill in the state
    assert!(wait_until(Duration::from_secs(5), || {
        let snapshot = receiver.snapshot();
        snapshot.power && snapshot.volume == 0x14 && snapshot.input == 2
    }));
    assert!(!receiver.snapshot().mute);

    receiver.set_volume_absolute(42).unwrap();
    assert!(wait_until(Duration::from_secs(5), || receiver.snapshot().volume == 42));

    // Rejected mute is reverted
    receiver.set_mute(true).unwrap();
    assert!(wait_until(Duration::from_secs(5), || {
        seen.try_iter().any(|message| message == "AMT01")
    }));
    assert!(wait_until(Duration::from_secs(5), || !receiver.snapshot().mute));

    platform.disconnect();
    assert!(!receiver.is_connected());
}
