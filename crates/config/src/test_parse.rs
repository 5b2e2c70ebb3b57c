#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, fs, path::Path, time::Duration};

    use hidkey_protocol::KeyCode;

    use crate::*;

    #[test]
    fn full_config_parses() {
        let ron = r#"(
            vendor_id: "0x1d57",
            product_id: 44,
            key_up_timeout: 250,
            mappings: { "0100280000000000": "OK", "01005200": "Up" },
        )"#;
        let cfg = load_from_str(ron, None).unwrap();
        assert_eq!(cfg.vendor_id(), 0x1d57);
        assert_eq!(cfg.product_id(), 44);
        assert_eq!(cfg.device_label(), "1d57-002c");
        assert_eq!(cfg.key_up_timeout(), Duration::from_millis(250));
        assert_eq!(cfg.double_click_window(), Duration::from_millis(500));
        assert!(cfg.debounce_enabled());
        let ok = KeyCode::parse("0100280000000000").unwrap();
        assert_eq!(cfg.mappings().get(&ok).map(String::as_str), Some("OK"));
    }

    #[test]
    fn timeout_may_be_quoted_or_omitted() {
        let cfg = load_from_str(
            r#"(vendor_id: 1, product_id: 2, key_up_timeout: "120")"#,
            None,
        )
        .unwrap();
        assert_eq!(cfg.key_up_timeout(), Duration::from_millis(120));

        let cfg = load_from_str("(vendor_id: 1, product_id: 2)", None).unwrap();
        assert!(!cfg.debounce_enabled());
        assert!(cfg.mappings().is_empty());
    }

    #[test]
    fn mapping_keys_are_normalised() {
        let cfg = load_from_str(
            r#"(vendor_id: 1, product_id: 2, mappings: { "0a0b": "Vol+" })"#,
            None,
        )
        .unwrap();
        let code = KeyCode::parse("0A0B").unwrap();
        assert_eq!(cfg.mappings().get(&code).map(String::as_str), Some("Vol+"));
    }

    #[test]
    fn missing_ids_are_rejected() {
        let err = load_from_str("(product_id: 2)", None).unwrap_err();
        match err {
            Error::Validation { field, .. } => assert_eq!(field, "vendor_id"),
            other => panic!("unexpected error: {other:?}"),
        }
        let err = load_from_str(r#"(vendor_id: 1, product_id: "0")"#, None).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation {
                field: "product_id",
                ..
            }
        ));
    }

    #[test]
    fn bad_timeout_is_rejected() {
        for bad in [r#""soon""#, "-5"] {
            let src = format!("(vendor_id: 1, product_id: 2, key_up_timeout: {bad})");
            let err = load_from_str(&src, None).unwrap_err();
            assert!(
                matches!(
                    err,
                    Error::Validation {
                        field: "key_up_timeout",
                        ..
                    }
                ),
                "{bad}: {err:?}"
            );
        }
    }

    #[test]
    fn non_hex_mapping_key_is_rejected() {
        let mut map = BTreeMap::new();
        map.insert("nope".to_string(), "x".to_string());
        let err = Config::new(1, 2, 100, map).unwrap_err();
        assert!(err.pretty().contains("mapping key \"nope\""));
    }

    #[test]
    fn unknown_field_reports_location() {
        let src = "(\n    vendor_id: 1,\n    product_id: 2,\n    colour: 3,\n)";
        let err = load_from_str(src, None).unwrap_err();
        match &err {
            Error::Parse { line, excerpt, .. } => {
                assert_eq!(*line, 4);
                assert!(excerpt.contains("colour"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.pretty().starts_with("Config parse error at line 4"));
    }

    #[test]
    fn load_from_path_checks_extension_and_attaches_path() {
        let dir = tempfile::tempdir().unwrap();
        let wrong = dir.path().join("config.toml");
        fs::write(&wrong, "").unwrap();
        let err = load_from_path(&wrong).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));

        let bad = dir.path().join("config.ron");
        fs::write(&bad, "(vendor_id: 1)").unwrap();
        let err = load_from_path(&bad).unwrap_err();
        assert_eq!(err.path(), Some(bad.as_path()));

        let good = dir.path().join("good.ron");
        fs::write(&good, "(vendor_id: 1, product_id: 2, key_up_timeout: 50)").unwrap();
        let cfg = load_from_path(&good).unwrap();
        assert_eq!(cfg.key_up_timeout(), Duration::from_millis(50));
    }

    #[test]
    fn explicit_path_wins() {
        let p = Path::new("/tmp/explicit.ron");
        assert_eq!(resolve_config_path(Some(p)).unwrap(), p);
    }
}
