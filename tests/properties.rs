//! Property tests for the claim encoding and the issue/verify cycle

use proptest::prelude::*;
use rtc_token::auth::{AppId, Privilege, PrivilegeKind, PrivilegeSet};
use rtc_token::codec::Message;
use rtc_token::{AccessTokenService, ChannelName, TokenConfig, VerifyError};

fn arb_privileges() -> impl Strategy<Value = PrivilegeSet> {
    prop::collection::btree_map(0..PrivilegeKind::ALL.len(), any::<u32>(), 0..=4).prop_map(
        |entries| {
            entries
                .into_iter()
                .map(|(i, expire_at)| Privilege::new(PrivilegeKind::ALL[i], expire_at))
                .collect()
        },
    )
}

fn arb_message() -> impl Strategy<Value = Message> {
    (
        "[a-zA-Z0-9_-]{1,32}",
        // At most 16 chars of at most 4 bytes each stays within the 64 byte limit
        "\\PC{1,16}",
        any::<u32>(),
        any::<u32>(),
        any::<u32>(),
        arb_privileges(),
    )
        .prop_map(|(app_id, channel, uid, issued_at, salt, privileges)| Message {
            app_id: AppId::parse(&app_id).unwrap(),
            channel: ChannelName::parse(&channel).unwrap(),
            uid,
            issued_at,
            salt,
            privileges,
        })
}

proptest! {
    #[test]
    fn decode_inverts_encode(msg in arb_message()) {
        prop_assert_eq!(Message::decode(&msg.encode()).unwrap(), msg);
    }

    #[test]
    fn distinct_messages_encode_differently(a in arb_message(), b in arb_message()) {
        prop_assert_eq!(a == b, a.encode() == b.encode());
    }

    #[test]
    fn decode_accepts_only_canonical_bytes(bytes in prop::collection::vec(any::<u8>(), 0..96)) {
        if let Ok(msg) = Message::decode(&bytes) {
            prop_assert_eq!(msg.encode(), bytes);
        }
    }

    #[test]
    fn issued_tokens_verify(
        secret in prop::collection::vec(any::<u8>(), 1..64),
        channel in "[a-z0-9]{1,64}",
        uid in 1u32..,
        now in 0u32..u32::MAX - 3600,
    ) {
        let svc = AccessTokenService::new(TokenConfig::from_parts("app1", secret).unwrap());
        let privileges: PrivilegeSet = [Privilege::new(PrivilegeKind::Join, now + 3600)]
            .into_iter()
            .collect();

        let token = svc.issue(&channel, uid, privileges, now).unwrap();
        let claims = svc.verify(token.as_str(), now, PrivilegeKind::Join).unwrap();
        prop_assert_eq!(&claims, token.claims());

        prop_assert_eq!(
            svc.verify(token.as_str(), now + 3600, PrivilegeKind::Join).unwrap_err(),
            VerifyError::PrivilegeExpired { kind: PrivilegeKind::Join, expire_at: now + 3600 }
        );
    }
}
