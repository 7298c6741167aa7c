use dayplan::error::{exit_codes, Error, JsonError};

#[test]
fn exit_codes_map_correctly() {
    let user = Error::InvalidArgument("bad".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let slot = Error::InvalidSlot("09:15".to_string());
    assert_eq!(slot.exit_code(), exit_codes::USER_ERROR);

    assert_eq!(Error::NotLoggedIn.exit_code(), exit_codes::USER_ERROR);

    let op = Error::OperationFailed("boom".to_string());
    assert_eq!(op.exit_code(), exit_codes::OPERATION_FAILED);

    let io = Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
    assert_eq!(io.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn json_error_includes_code_and_details() {
    let err = Error::BlockNotFound("abcd1234".to_string());
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    assert!(json.error.contains("Block task not found"));
    assert_eq!(json.details, Some(serde_json::json!({ "block_id": "abcd1234" })));

    let plain = JsonError::from(&Error::NotLoggedIn);
    assert!(plain.details.is_none());
}
