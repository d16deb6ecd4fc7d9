//! # Capability Matrix from a Dependent Crate
//!
//! The matrix is compiled into kv-port; a dependent crate sees the same
//! constants, report and strategy selection as kv-port itself.

#[cfg(test)]
mod tests {
    use kv_port::checksum;
    use kv_port::compression::available_codecs;
    use kv_port::config::{self, Capability, CapabilityReport, Origin, BUILD};
    use kv_port::{CloexecStrategy, CompressionType, FlushKind};

    fn externally_defined(capability: Capability) -> bool {
        BUILD.get(capability).origin == Origin::External
    }

    #[test]
    fn test_constants_agree_with_matrix() {
        let constants = [
            (Capability::Fdatasync, config::HAVE_FDATASYNC),
            (Capability::Fullfsync, config::HAVE_FULLFSYNC),
            (Capability::OCloexec, config::HAVE_O_CLOEXEC),
            (Capability::Crc32c, config::HAVE_CRC32C),
            (Capability::Snappy, config::HAVE_SNAPPY),
            (Capability::Zstd, config::HAVE_ZSTD),
        ];

        for (capability, enabled) in constants {
            assert_eq!(BUILD.is_enabled(capability), enabled, "{capability}");
        }
    }

    #[test]
    fn test_full_feature_links_every_library() {
        for capability in [Capability::Crc32c, Capability::Snappy, Capability::Zstd] {
            if externally_defined(capability) {
                continue;
            }
            assert!(BUILD.is_enabled(capability), "{capability}");
            assert_ne!(BUILD.get(capability).origin, Origin::Default);
        }
    }

    #[test]
    fn test_codecs_follow_matrix() {
        let codecs = available_codecs();

        assert!(codecs.contains(&CompressionType::None));
        assert_eq!(
            codecs.contains(&CompressionType::Snappy),
            BUILD.is_enabled(Capability::Snappy)
        );
        assert_eq!(
            codecs.contains(&CompressionType::Zstd),
            BUILD.is_enabled(Capability::Zstd)
        );
    }

    #[test]
    fn test_strategies_follow_matrix() {
        let flush = if config::HAVE_FULLFSYNC {
            FlushKind::FullDevice
        } else if config::HAVE_FDATASYNC {
            FlushKind::DataOnly
        } else {
            FlushKind::Standard
        };
        assert_eq!(FlushKind::PREFERRED, flush);

        if config::HAVE_O_CLOEXEC {
            assert_eq!(CloexecStrategy::CURRENT, CloexecStrategy::Atomic);
        } else {
            assert_ne!(CloexecStrategy::CURRENT, CloexecStrategy::Atomic);
        }

        let expected = if config::HAVE_CRC32C && checksum::can_accelerate() {
            "accelerated"
        } else {
            "portable"
        };
        assert_eq!(checksum::active().name(), expected);
    }

    #[test]
    fn test_report_json() {
        let report = CapabilityReport::current();
        let json = serde_json::to_value(&report).expect("serialize");
        let entries = json["capabilities"].as_array().expect("array");

        assert_eq!(entries.len(), Capability::COUNT);
        for (entry, capability) in entries.iter().zip(Capability::ALL) {
            assert_eq!(entry["define"], capability.define_name());
            assert_eq!(entry["enabled"], BUILD.is_enabled(capability));
            assert_eq!(entry.get("feature").is_some(), capability.feature().is_some());
        }
    }
}
