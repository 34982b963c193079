//! Integration tests for issuing and verifying tokens
//!
//! These tests go through the public API only: issue, hand the string around,
//! verify.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rtc_token::auth::{Privilege, PrivilegeKind, PrivilegeSet, RawToken};
use rtc_token::{
    AccessTokenService, FixedSalt, InvalidToken, ReplayGuard, TokenConfig, VerifyError,
};
use std::sync::Arc;

const NOW: u32 = 1_700_000_000;

fn service(secret: &[u8]) -> AccessTokenService {
    AccessTokenService::new(TokenConfig::from_parts("app1", secret.to_vec()).unwrap())
}

fn join_for(secs: u32) -> PrivilegeSet {
    [Privilege::new(PrivilegeKind::Join, NOW + secs)]
        .into_iter()
        .collect()
}

#[test]
fn test_scenario_room42() {
    let svc = service(b"s3cr3t");
    let token = svc.issue("room42", 7, join_for(3600), NOW).unwrap();
    assert!(!token.as_str().is_empty());

    let claims = svc.verify(token.as_str(), NOW, PrivilegeKind::Join).unwrap();
    assert_eq!(claims.channel, "room42");
    assert_eq!(claims.uid, 7);
    assert_eq!(claims.app_id.as_str(), "app1");

    assert!(matches!(
        svc.verify(token.as_str(), 1_700_003_601, PrivilegeKind::Join),
        Err(VerifyError::PrivilegeExpired { .. })
    ));

    let wrong = service(b"wrong");
    assert_eq!(
        wrong
            .verify(token.as_str(), NOW, PrivilegeKind::Join)
            .unwrap_err(),
        VerifyError::BadSignature
    );
}

#[test]
fn test_expiry_boundary() {
    let svc = service(b"s3cr3t");
    let issued_at = NOW - 100;
    let privileges: PrivilegeSet = [Privilege::new(PrivilegeKind::Join, NOW)]
        .into_iter()
        .collect();
    let token = svc.issue("room42", 7, privileges, issued_at).unwrap();

    assert!(svc
        .verify(token.as_str(), NOW - 1, PrivilegeKind::Join)
        .is_ok());
    assert_eq!(
        svc.verify(token.as_str(), NOW, PrivilegeKind::Join)
            .unwrap_err(),
        VerifyError::PrivilegeExpired {
            kind: PrivilegeKind::Join,
            expire_at: NOW
        }
    );
}

#[test]
fn test_expire_one_second_after_now_accepted() {
    let svc = service(b"s3cr3t");
    let token = svc.issue("room42", 7, join_for(1), NOW).unwrap();
    assert!(svc.verify(token.as_str(), NOW, PrivilegeKind::Join).is_ok());
}

#[test]
fn test_fixed_salt_is_deterministic() {
    let a = service(b"s3cr3t").with_salt_source(FixedSalt(99));
    let b = service(b"s3cr3t").with_salt_source(FixedSalt(99));

    let first = a.issue("room42", 7, join_for(60), NOW).unwrap();
    let second = b.issue("room42", 7, join_for(60), NOW).unwrap();
    assert_eq!(first.as_str(), second.as_str());
}

#[test]
fn test_random_salt_differs() {
    let svc = service(b"s3cr3t");

    // A collision needs three equal u32 draws in a row
    let tokens: Vec<String> = (0..3)
        .map(|_| svc.issue("room42", 7, join_for(60), NOW).unwrap().into_string())
        .collect();
    assert!(tokens[0] != tokens[1] || tokens[1] != tokens[2]);
}

#[test]
fn test_privilege_order_irrelevant() {
    let svc = service(b"s3cr3t").with_salt_source(FixedSalt(1));
    let join = Privilege::new(PrivilegeKind::Join, NOW + 60);
    let video = Privilege::new(PrivilegeKind::PublishVideo, NOW + 30);

    let a = svc
        .issue("room42", 7, [join, video].into_iter().collect(), NOW)
        .unwrap();
    let b = svc
        .issue("room42", 7, [video, join].into_iter().collect(), NOW)
        .unwrap();
    assert_eq!(a.as_str(), b.as_str());
}

#[test]
fn test_every_bit_flip_rejected() {
    let svc = service(b"s3cr3t").with_salt_source(FixedSalt(7));
    let token = svc.issue("room42", 7, join_for(3600), NOW).unwrap();
    let bytes = URL_SAFE_NO_PAD.decode(token.as_str()).unwrap();

    // Skip the version byte, which is gated before the signature check
    for byte in 1..bytes.len() {
        for bit in 0..8 {
            let mut tampered = bytes.clone();
            tampered[byte] ^= 1 << bit;

            let result = svc.verify(
                &URL_SAFE_NO_PAD.encode(&tampered),
                NOW,
                PrivilegeKind::Join,
            );
            assert_eq!(
                result.unwrap_err(),
                VerifyError::BadSignature,
                "flip of bit {} in byte {} was not caught",
                bit,
                byte
            );
        }
    }
}

#[test]
fn test_version_bit_flip_rejected() {
    let svc = service(b"s3cr3t");
    let token = svc.issue("room42", 7, join_for(3600), NOW).unwrap();
    let bytes = URL_SAFE_NO_PAD.decode(token.as_str()).unwrap();

    for bit in 0..8 {
        let mut tampered = bytes.clone();
        tampered[0] ^= 1 << bit;
        let result = svc.verify(
            &URL_SAFE_NO_PAD.encode(&tampered),
            NOW,
            PrivilegeKind::Join,
        );
        assert!(matches!(result, Err(VerifyError::UnsupportedVersion(_))));
    }
}

#[test]
fn test_tampered_claims_rejected() {
    let svc = service(b"s3cr3t");
    let token = svc.issue("room42", 7, join_for(60), NOW).unwrap();

    // Rewrite uid 7 -> 8 in the message region and re-encode
    let mut raw = RawToken::parse(token.as_str()).unwrap();
    let uid_offset = 2 + "app1".len() + 2 + "room42".len();
    assert_eq!(raw.message[uid_offset], 7);
    raw.message[uid_offset] = 8;

    assert_eq!(
        svc.verify(&raw.to_token_string(), NOW, PrivilegeKind::Join)
            .unwrap_err(),
        VerifyError::BadSignature
    );
}

#[test]
fn test_garbage_tokens_rejected() {
    let svc = service(b"s3cr3t");

    let oversized = "A".repeat(10_000);

    for token in ["", "abc", "not a token", "====", oversized.as_str()] {
        let err = svc.verify(token, NOW, PrivilegeKind::Join).unwrap_err();
        assert!(matches!(err, VerifyError::Parse(_)), "{:?} gave {:?}", token, err);
        assert_eq!(InvalidToken::from(err).to_string(), "invalid token");
    }
}

#[tokio::test]
async fn test_concurrent_issue_and_verify() {
    let svc = Arc::new(service(b"s3cr3t"));

    let mut handles = vec![];
    for i in 0..100u32 {
        let svc = svc.clone();
        handles.push(tokio::spawn(async move {
            let channel = format!("room{}", i);
            let token = svc.issue(&channel, i + 1, join_for(60), NOW).unwrap();
            let claims = svc
                .verify_for(token.as_str(), &channel, i + 1, NOW, PrivilegeKind::Join)
                .unwrap();
            assert_eq!(claims.uid, i + 1);
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test]
async fn test_concurrent_replay_accepts_once() {
    let svc = Arc::new(service(b"s3cr3t").with_replay_guard(ReplayGuard::new()));
    let token = svc.issue("room42", 7, join_for(60), NOW).unwrap().into_string();

    let mut handles = vec![];
    for _ in 0..50 {
        let svc = svc.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            svc.verify(&token, NOW, PrivilegeKind::Join)
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(e) => assert_eq!(e, VerifyError::Replayed),
        }
    }
    assert_eq!(accepted, 1);
}
