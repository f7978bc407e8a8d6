use super::*;
use crate::net::error::ApiError;

#[test]
fn input_state_skips_blank_and_own_name() {
    assert_eq!(UsernameCheck::for_input("  ", None), UsernameCheck::Idle);
    assert_eq!(UsernameCheck::for_input(" alice ", Some("alice")), UsernameCheck::Idle);
    assert_eq!(UsernameCheck::for_input("al", None), UsernameCheck::TooShort);
    assert_eq!(UsernameCheck::for_input("ali", Some("alice")), UsernameCheck::Checking);
}

#[test]
fn replies_map_onto_states() {
    assert_eq!(UsernameCheck::from_reply(Ok(true)), UsernameCheck::Available);
    assert_eq!(UsernameCheck::from_reply(Ok(false)), UsernameCheck::Taken);
    assert_eq!(UsernameCheck::from_reply(Err(ApiError::network())), UsernameCheck::Unknown);
}

#[test]
fn only_known_problems_block_submit() {
    let blocking: Vec<_> = [
        UsernameCheck::Idle,
        UsernameCheck::TooShort,
        UsernameCheck::Checking,
        UsernameCheck::Available,
        UsernameCheck::Taken,
        UsernameCheck::Unknown,
    ]
    .into_iter()
    .filter(|c| c.blocks_submit())
    .collect();
    assert_eq!(blocking, vec![UsernameCheck::TooShort, UsernameCheck::Checking, UsernameCheck::Taken]);
}
