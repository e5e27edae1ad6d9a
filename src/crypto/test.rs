use super::*;

// Always hands out the same salt so salted digests can be checked byte for byte.
struct FixedSalt([u8; SALT_SIZE]);

impl SaltSource for FixedSalt {
    fn salt(&mut self) -> [u8; SALT_SIZE] {
        self.0
    }
}

// Decodes a salted digest into its salt and hash portions.
fn split(digest: &str) -> (Vec<u8>, Vec<u8>) {
    let mut blob = STANDARD.decode(digest).unwrap();
    assert_eq!(SALTED_DIGEST_SIZE, blob.len(), "{digest}");
    let hash = blob.split_off(SALT_SIZE);
    (blob, hash)
}

mod digest_mode {
    use super::*;

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!(DigestMode::PlainMd5, "plain-md5".parse().unwrap());
        assert_eq!(DigestMode::PlainMd5, "md5".parse().unwrap());
        assert_eq!(DigestMode::Salted, "salted".parse().unwrap());
        assert_eq!(DigestMode::Salted, "salt".parse().unwrap());
    }

    #[test]
    fn round_trips_through_display() {
        for mode in [DigestMode::PlainMd5, DigestMode::Salted] {
            assert_eq!(mode, mode.to_string().parse().unwrap());
        }
    }

    #[test]
    fn rejects_unknown_modes() {
        for name in ["", "sha1", "MD5", "bcrypt"] {
            match name.parse::<DigestMode>() {
                Err(Error::UnsupportedDigestMode(n)) => assert_eq!(name, n),
                x => panic!("expected UnsupportedDigestMode for {name:?} but received:\n{x:?}"),
            }
        }
    }
}

mod md5_digest {
    use super::*;

    #[test]
    fn matches_known_vectors() {
        assert_eq!("5F4DCC3B5AA765D61D8327DEB882CF99", md5_digest("password"));
        assert_eq!("D41D8CD98F00B204E9800998ECF8427E", md5_digest(""));
        assert_eq!("21232F297A57A5A743894A0E4A801FC3", md5_digest("admin"));
    }

    #[test]
    fn hashes_utf8_bytes() {
        assert_eq!("12841E4BA5E37D2FBFC78458C6714ADE", md5_digest("pässwörd"));
    }

    #[test]
    fn is_deterministic_uppercase_hex() {
        for plaintext in ["", "a", "correct horse battery staple", "ünïcödé"] {
            let first = md5_digest(plaintext);
            assert_eq!(first, md5_digest(plaintext));
            assert_eq!(32, first.len());
            assert!(
                first
                    .chars()
                    .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()),
                "{first}",
            );
        }
    }
}

mod salted_digest {
    use super::*;

    #[test]
    fn matches_known_vector_for_salt_string() {
        assert_eq!(
            "TLnIqASP0CKUR3/LGkEZGkutY7pUjykXHTMPQYWUiSoCD6yDYinbpvJqqXeUFrpI",
            salted_digest("password", salt_from_str("changeme")),
        );
    }

    #[test]
    fn matches_known_vector_for_raw_salt() {
        let salt: [u8; SALT_SIZE] = std::array::from_fn(|i| i as u8);
        assert_eq!(
            "AAECAwQFBgcICQoLDA0OD1jdsdVbSj84u2X/UaLAN36U/DEbo2NVFOM2IQpvnyuv",
            salted_digest("password", salt),
        );
    }

    #[test]
    fn embeds_md5_of_salt_string() {
        let digest = salted_digest("password", salt_from_str("changeme"));
        let (salt, _) = split(&digest);
        assert_eq!(Md5::digest(b"changeme").as_slice(), salt.as_slice());
    }

    #[test]
    fn changing_plaintext_or_salt_changes_output() {
        let base = salted_digest("password", salt_from_str("changeme"));

        // Same salt, different plaintext: the salt prefix survives but the hash changes.
        let other_plaintext = salted_digest("admin", salt_from_str("changeme"));
        assert_eq!(
            "TLnIqASP0CKUR3/LGkEZGofgXHzc9mPq56c8+8zm0dpKd2CZQLECwCTSgxWC/cMU",
            other_plaintext,
        );
        assert_eq!(split(&base).0, split(&other_plaintext).0);
        assert_ne!(split(&base).1, split(&other_plaintext).1);

        // One byte of salt string differs.
        let other_salt = salted_digest("password", salt_from_str("changemf"));
        assert_eq!(
            "jrPokqKbOS52V9psjKB7eYY4magjSt0bfjSw6chYjkDlnXaK+pENL5WWxlpBhFhS",
            other_salt,
        );
    }

    #[test]
    fn empty_plaintext_has_fixed_length() {
        let digest = salted_digest("", salt_from_str("salt"));
        assert_eq!(
            "zrIHcuDJ0kDHXrJrDjer7k00K2BgHiUdVGvPBUMkj6QCHxKU+PC34KjA34CzVUH4",
            digest,
        );
        assert_eq!(64, digest.len());
    }
}

mod digest {
    use super::*;

    #[test]
    fn dispatches_on_mode_name() {
        assert_eq!(
            "5F4DCC3B5AA765D61D8327DEB882CF99",
            digest("password", "plain-md5", None).unwrap(),
        );
        assert_eq!(
            "TLnIqASP0CKUR3/LGkEZGkutY7pUjykXHTMPQYWUiSoCD6yDYinbpvJqqXeUFrpI",
            digest("password", "salted", Some("changeme")).unwrap(),
        );
    }

    #[test]
    fn plain_md5_ignores_salt() {
        assert_eq!(
            digest("password", "md5", None).unwrap(),
            digest("password", "md5", Some("changeme")).unwrap(),
        );
    }

    #[test]
    fn unsupported_mode_fails_without_leaking_plaintext() {
        let err = digest("hunter2", "rot13", Some("pepper")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedDigestMode(_)), "{err:?}");
        let message = err.to_string();
        assert!(!message.contains("hunter2"), "{message}");
        assert!(!message.contains("pepper"), "{message}");
    }

    #[test]
    fn random_salts_differ_but_keep_shape() {
        let first = digest("password", "salted", None).unwrap();
        let second = digest("password", "salted", None).unwrap();
        assert_ne!(first, second);
        for d in [&first, &second] {
            assert_eq!(64, d.len());
            let _ = split(d);
            assert!(verify("password", d));
        }
    }

    #[test]
    fn uses_salt_source_only_without_salt_string() {
        let salt: [u8; SALT_SIZE] = std::array::from_fn(|i| i as u8);
        let mut source = FixedSalt(salt);
        assert_eq!(
            "AAECAwQFBgcICQoLDA0OD1jdsdVbSj84u2X/UaLAN36U/DEbo2NVFOM2IQpvnyuv",
            digest_with("password", DigestMode::Salted, None, &mut source),
        );
        assert_eq!(
            "TLnIqASP0CKUR3/LGkEZGkutY7pUjykXHTMPQYWUiSoCD6yDYinbpvJqqXeUFrpI",
            digest_with("password", DigestMode::Salted, Some("changeme"), &mut source),
        );
    }
}

mod verify {
    use super::*;

    #[test]
    fn accepts_matching_plain_md5_in_either_case() {
        assert!(verify("password", "5F4DCC3B5AA765D61D8327DEB882CF99"));
        assert!(verify("password", "5f4dcc3b5aa765d61d8327deb882cf99"));
        assert!(!verify("Password", "5F4DCC3B5AA765D61D8327DEB882CF99"));
    }

    #[test]
    fn accepts_matching_salted_digest() {
        let digest = "TLnIqASP0CKUR3/LGkEZGkutY7pUjykXHTMPQYWUiSoCD6yDYinbpvJqqXeUFrpI";
        assert!(verify("password", digest));
        assert!(!verify("passwort", digest));
    }

    #[test]
    fn rejects_other_shapes() {
        for digest in ["", "not base64!", "AAAA", "5F4DCC3B5AA765D61D8327DEB882CF9"] {
            assert!(!verify("password", digest), "{digest:?}");
        }
    }
}
