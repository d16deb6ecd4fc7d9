//! # Block Storage Flows
//!
//! Exercises the platform layer the way a table writer and reader use it:
//!
//! 1. **Write path**: raw block → `encode_block` → `WritableFile::append` → `sync`
//! 2. **Read path**: file bytes → `decode_block` (trailer type + masked CRC32C)
//! 3. **Manifest path**: directory entry synced before the file itself

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use kv_port::checksum;
    use kv_port::compression::{decode_block, encode_block, BLOCK_TRAILER_SIZE};
    use kv_port::durability::{open_file, syncer_for, OpenMode, WritableFile};
    use kv_port::{BlockOptions, CompressionType, FlushKind, PortError};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Sorted key/value run, the shape of a data block.
    fn data_block(seed: u32) -> Vec<u8> {
        (0..256u32)
            .flat_map(|i| format!("key-{:08}:value-{:04}|", seed * 1000 + i, i % 7).into_bytes())
            .collect()
    }

    /// Append blocks to `path` and return each block's (offset, length).
    fn write_table(path: &Path, blocks: &[(BlockOptions, Vec<u8>)]) -> Vec<(usize, usize)> {
        let mut file = WritableFile::create(path).expect("create table");
        let mut handles = Vec::new();
        let mut offset = 0;

        for (options, raw) in blocks {
            let block = encode_block(options, raw);
            file.append(&block).expect("append");
            handles.push((offset, block.len()));
            offset += block.len();
        }

        file.sync().expect("sync");
        file.close().expect("close");
        handles
    }

    // =============================================================================
    // WRITE / READ
    // =============================================================================

    #[test]
    fn test_table_round_trip_with_every_codec() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("000005.ldb");

        let blocks: Vec<_> = CompressionType::ALL
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                (
                    BlockOptions::new().with_compression(*kind),
                    data_block(i as u32),
                )
            })
            .collect();

        let handles = write_table(&path, &blocks);
        let contents = fs::read(&path).expect("read table");
        assert_eq!(contents.len(), handles.iter().map(|(_, len)| len).sum::<usize>());

        // The reader learns the codec from the trailer, not from its own options.
        let reader = BlockOptions::new().with_compression(CompressionType::None);
        for ((offset, len), (options, raw)) in handles.iter().zip(&blocks) {
            let block = &contents[*offset..*offset + *len];
            let type_byte = block[block.len() - BLOCK_TRAILER_SIZE];
            assert_eq!(type_byte, options.effective_compression().as_u8());

            let decoded = decode_block(block, &reader, true).expect("decode");
            assert_eq!(&decoded, raw);
        }
    }

    #[test]
    fn test_compressed_blocks_are_smaller_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let raw = data_block(1);

        for kind in [CompressionType::Snappy, CompressionType::Zstd] {
            if !kind.is_available() {
                continue;
            }
            let path = dir.path().join(format!("{kind}.ldb"));
            let options = BlockOptions::new().with_compression(kind);
            let handles = write_table(&path, &[(options, raw.clone())]);

            assert!(handles[0].1 < raw.len() + BLOCK_TRAILER_SIZE);
        }
    }

    #[test]
    fn test_corruption_on_disk_detected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("000009.ldb");
        let options = BlockOptions::default();

        write_table(&path, &[(options.clone(), data_block(9))]);

        let mut contents = fs::read(&path).expect("read table");
        contents[10] ^= 0x40;
        fs::write(&path, &contents).expect("rewrite table");

        let err = decode_block(&contents, &options, true).expect_err("corrupt block");
        assert!(err.is_corruption());
        assert!(matches!(err, PortError::Corruption(_)));
    }

    #[test]
    fn test_trailer_crc_matches_checksum_layer() {
        let options = BlockOptions::new().with_compression(CompressionType::None);
        let raw = data_block(3);
        let block = encode_block(&options, &raw);

        let (body, trailer) = block.split_at(block.len() - BLOCK_TRAILER_SIZE);
        let stored = u32::from_le_bytes([trailer[1], trailer[2], trailer[3], trailer[4]]);
        let expected = checksum::extend(checksum::value(body), &trailer[..1]);

        assert_eq!(checksum::unmask(stored), expected);
    }

    // =============================================================================
    // DURABILITY
    // =============================================================================

    #[test]
    fn test_log_reopened_for_append() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("000003.log");
        let options = BlockOptions::default();
        let first = encode_block(&options, &data_block(1));
        let second = encode_block(&options, &data_block(2));

        let mut log = WritableFile::create(&path).expect("create log");
        log.append(&first).expect("append");
        log.close().expect("close");

        let mut log = WritableFile::append_to(&path).expect("reopen log");
        log.append(&second).expect("append");
        log.sync().expect("sync");
        log.close().expect("close");

        let contents = fs::read(&path).expect("read log");
        let (a, b) = contents.split_at(first.len());
        assert_eq!(decode_block(a, &options, true).expect("first"), data_block(1));
        assert_eq!(decode_block(b, &options, true).expect("second"), data_block(2));
    }

    #[test]
    fn test_manifest_sync() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("MANIFEST-000001");

        let mut manifest = WritableFile::create(&path).expect("create manifest");
        assert!(manifest.is_manifest());

        manifest.append(b"edit: add 000005.ldb").expect("append");
        manifest.sync().expect("sync");
        assert_eq!(manifest.buffered(), 0);
        manifest.close().expect("close");

        let file = open_file(&path, OpenMode::Read).expect("open manifest");
        assert_eq!(file.metadata().expect("metadata").len(), 20);
    }

    #[test]
    fn test_every_available_flush_kind_persists() {
        let dir = tempfile::tempdir().expect("tempdir");

        let kinds = [FlushKind::FullDevice, FlushKind::DataOnly, FlushKind::Standard];
        for (i, kind) in kinds.into_iter().enumerate() {
            let Ok(syncer) = syncer_for(kind) else {
                assert!(!kind.is_available());
                continue;
            };

            let path = dir.path().join(format!("00000{i}.log"));
            let mut file = WritableFile::create(&path)
                .expect("create")
                .with_syncer(syncer);
            file.append(&data_block(4)).expect("append");
            file.sync().expect("sync");
            file.close().expect("close");

            assert_eq!(fs::read(&path).expect("read"), data_block(4));
        }
    }
}
