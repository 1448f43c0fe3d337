//! Integration tests for awg-obfs
//!
//! Tests the full path from config text to obfuscation decisions:
//! - Enable gating and activation
//! - Header range validation
//! - Malformed input handling
//! - Header selection and junk generation on a parsed config

use awg_obfs::config::{obfuscation_enabled, parse};
use awg_obfs::obfuscation::{HeaderSelector, JunkGenerator};
use awg_obfs::{AwgConfig, ConfigError, Error, MagicHeader, MessageType, Parser};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

const EXAMPLE: &str = "\
enabled=true
jc=5
jmin=20
jmax=200
s1=10
s2=10
s3=10
s4=5
h1=157
h2=158
h3=159
h4=160
";

#[test]
fn test_example_config() {
    let config = parse(EXAMPLE).expect("Failed to parse example");

    assert!(config.enabled);
    assert_eq!(config.junk_packet_count, 5);
    assert_eq!(config.junk_packet_min_size, 20);
    assert_eq!(config.junk_packet_max_size, 200);
    assert_eq!(config.transport_packet_junk_size, 5);
    assert_eq!(config.init_packet_magic_header.min(), 157);
    assert_eq!(config.init_packet_magic_header.max(), 157);
    assert_eq!(config.cookie_packet_magic_header, MagicHeader::single(159));
    assert!(config.is_enabled());
    assert!(config.validate().is_ok());
}

#[test]
fn test_texts_without_enabled_true() {
    let texts = [
        "",
        "\n\n",
        "# only a comment",
        "jc=5\njmin=20",
        "enabled=false\njc=5",
        "enabled=yes\njc=5\nh1=100",
        "enabled = false\nenabled=true\ns1=10",
    ];

    for text in texts {
        let config = parse(text).unwrap_or_else(|e| panic!("{text:?}: {e}"));
        assert_eq!(config, AwgConfig::default(), "{text:?}");
        assert!(!config.is_enabled(), "{text:?}");
    }
}

#[test]
fn test_activation_signals() {
    assert!(!parse("enabled=true").unwrap().is_enabled());
    assert!(parse("enabled=true\njc=1").unwrap().is_enabled());
    assert!(parse("enabled=true\ns3=1").unwrap().is_enabled());
    assert!(parse("enabled=true\nh1=10").unwrap().is_enabled());
    assert!(!parse("enabled=true\nh1=3").unwrap().is_enabled());
    assert!(!obfuscation_enabled(None));
}

#[test]
fn test_header_validation_messages() {
    assert!(MagicHeader::new(0, 0).validate("whatever").is_ok());
    assert!(MagicHeader::new(5, 5).validate("h1").is_ok());

    let err = MagicHeader::new(3, 10).validate("h1").unwrap_err();
    assert!(err.to_string().contains("min=3"));

    let err = MagicHeader::new(10, 5).validate("h1").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("min=10") && msg.contains("max=5"), "{msg}");
}

#[test]
fn test_parsed_reserved_header_fails_validation() {
    let config = parse("enabled=true\njc=1\nh3=2").unwrap();
    assert!(config.is_enabled());
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ReservedMagicHeader { ref name, min: 2 }) if name == "h3"
    ));
}

#[test]
fn test_malformed_line_before_enabled() {
    let err = parse("badline\nenabled=true\njc=1").unwrap_err();
    assert_eq!(err, ConfigError::Syntax { line: 1 });

    // No enabled key means every line is read
    assert!(parse("jc=1\n\nbadline").is_err());
}

#[test]
fn test_malformed_line_after_disabled_flag() {
    let config = parse("# header\nenabled=false\nbadline\nalso bad").unwrap();
    assert_eq!(config, AwgConfig::default());
}

#[test]
fn test_enabled_flag_asymmetry() {
    // The first occurrence gates, the last one is kept
    let config = parse("enabled=true\njc=5\nenabled=false").unwrap();
    assert!(!config.enabled);
    assert_eq!(config.junk_packet_count, 5);
    assert!(!config.is_enabled());

    let config = parse("enabled=false\nenabled=true\njc=5").unwrap();
    assert_eq!(config, AwgConfig::default());
}

#[test]
fn test_strict_and_lenient() {
    let text = "enabled=true\njc=2\njmin=twenty\njmax=200";

    let lenient = parse(text).unwrap();
    assert_eq!(lenient.junk_packet_min_size, 0);
    assert_eq!(lenient.junk_packet_max_size, 200);

    let err = Parser::new().strict(true).parse(text).unwrap_err();
    assert_eq!(
        err,
        ConfigError::InvalidValue {
            line: 3,
            key: "jmin".to_string(),
            value: "twenty".to_string(),
        }
    );
    assert!(err.to_string().contains("jmin"));
}

#[test]
fn test_load_from_file() {
    let path = std::env::temp_dir().join(format!("awg-obfs-{}.conf", std::process::id()));
    std::fs::write(&path, EXAMPLE).unwrap();

    let config = AwgConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(config, parse(EXAMPLE).unwrap());

    let missing = AwgConfig::load(path.with_extension("missing"));
    assert!(matches!(missing, Err(Error::Io(_))));
}

#[test]
fn test_load_syntax_error() {
    let path = std::env::temp_dir().join(format!("awg-obfs-bad-{}.conf", std::process::id()));
    std::fs::write(&path, "enabled=true\nnot a pair\n").unwrap();

    let result = AwgConfig::load(&path);
    std::fs::remove_file(&path).unwrap();
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::Syntax { line: 2 }))
    ));
}

#[test]
fn test_toml_embedding() {
    let config = parse(EXAMPLE).unwrap();
    let text = toml::to_string_pretty(&config).unwrap();
    assert!(text.contains("junk_packet_count = 5"));

    let back: AwgConfig = toml::from_str(&text).unwrap();
    assert_eq!(back, config);

    // Missing fields fall back to zero
    let partial: AwgConfig = toml::from_str("enabled = true\njunk_packet_count = 2\n").unwrap();
    assert_eq!(partial.junk_packet_count, 2);
    assert_eq!(partial.init_packet_magic_header, MagicHeader::DISABLED);
}

#[test]
fn test_obfuscated_handshake_plan() {
    let config = Arc::new(parse(EXAMPLE).unwrap());
    let mut rng = StdRng::seed_from_u64(0xA36);

    let junk = JunkGenerator::new(&config);
    let packets = junk.packets(&mut rng).unwrap();
    assert_eq!(packets.len(), 5);
    assert!(packets.iter().all(|p| (20..=200).contains(&p.len())));

    let selector = HeaderSelector::new(&config);
    for (kind, expected) in MessageType::ALL.into_iter().zip([157, 158, 159, 160]) {
        let header = selector.header_for(kind, &mut rng).unwrap();
        assert_eq!(header, expected);
        assert_eq!(selector.classify(header), Some(kind));
        assert_eq!(selector.classify(kind.id()), None);
    }

    assert_eq!(junk.framed_size(MessageType::HandshakeInit), 158);
    let prefix = junk.message_prefix(MessageType::Transport, &mut rng).unwrap();
    assert_eq!(prefix.len(), 5);
}

#[test]
fn test_shared_read_only() {
    let config = Arc::new(parse(EXAMPLE).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let config = Arc::clone(&config);
            std::thread::spawn(move || config.is_enabled() && config.validate().is_ok())
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn test_oversized_junk_count() {
    let config = parse("enabled=true\njc=4294967295\njmin=10\njmax=20").unwrap();
    assert_eq!(config.junk_packet_count, u32::MAX);
    assert!(config.is_enabled());

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::OutOfRange { key: "jc", .. }));
    assert!(err.to_string().contains("128"), "{err}");

    // Generation refuses before allocating anything
    let mut rng = StdRng::seed_from_u64(7);
    assert!(JunkGenerator::new(&config).packets(&mut rng).is_err());
}

#[test]
fn test_lenient_value_fallbacks() {
    let config = parse("enabled=true\njc=5 # five\nh1=157\nh1=bogus\nh2=100-200").unwrap();
    assert_eq!(config.junk_packet_count, 5);
    assert_eq!(config.init_packet_magic_header, MagicHeader::DISABLED);
    assert_eq!(config.response_packet_magic_header, MagicHeader::single(100));
}

#[test]
fn test_display_round_trip() {
    let strict = Parser::new().strict(true);
    let config = strict
        .parse("enabled=true\njc=3\njmin=10\njmax=30\nh2=1000-2000")
        .unwrap();
    assert_eq!(config.response_packet_magic_header, MagicHeader::new(1000, 2000));

    let rendered = config.to_string();
    assert_eq!(strict.parse(&rendered).unwrap(), config);

    // A switched-off config renders as the flag alone
    let off = AwgConfig {
        enabled: false,
        ..config
    };
    assert_eq!(off.to_string(), "enabled=false\n");
    assert_eq!(parse(&off.to_string()).unwrap(), AwgConfig::default());
}
