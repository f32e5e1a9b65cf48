use crate::{
    Result,
    constants::{MAX_READER_ID, MAX_UID_LENGTH, MIN_READER_ID, MIN_UID_LENGTH, UID_TEXT_CAPACITY},
    error::Error,
    uid::UidText,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reader identifier (1 or 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ReaderId(u8);

impl ReaderId {
    /// First reader on the bus.
    pub const FIRST: ReaderId = ReaderId(MIN_READER_ID);

    /// Second reader on the bus.
    pub const SECOND: ReaderId = ReaderId(MAX_READER_ID);

    /// Create a new reader ID with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidReaderId` if the ID is outside the valid range (1-2).
    pub fn new(id: u8) -> Result<Self> {
        if !(MIN_READER_ID..=MAX_READER_ID).contains(&id) {
            return Err(Error::InvalidReaderId { id });
        }
        Ok(ReaderId(id))
    }

    /// Get the raw reader ID as u8.
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    /// Zero-based position of the reader in polling order.
    #[must_use]
    pub fn index(&self) -> usize {
        (self.0 - MIN_READER_ID) as usize
    }
}

impl fmt::Display for ReaderId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ReaderId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let id: u8 = s
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("Invalid reader ID: {s}")))?;
        ReaderId::new(id)
    }
}

impl TryFrom<u8> for ReaderId {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self> {
        ReaderId::new(id)
    }
}

impl From<ReaderId> for u8 {
    fn from(id: ReaderId) -> Self {
        id.0
    }
}

/// Raw identifier bytes reported by a card.
///
/// Only lives for the duration of one read transaction; the poll loop turns
/// it into an [`RfidEvent`] straight away.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardUid(Vec<u8>);

impl CardUid {
    /// Create a UID from the bytes returned by a driver.
    ///
    /// Lengths above [`MAX_UID_LENGTH`] are accepted; normalization truncates
    /// them to the event buffer.
    ///
    /// # Errors
    /// Returns `Error::InvalidUid` if the UID is empty.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() < MIN_UID_LENGTH {
            return Err(Error::InvalidUid("UID cannot be empty".to_string()));
        }
        Ok(CardUid(bytes))
    }

    /// Get the UID bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of UID bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; kept for API symmetry with slices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the UID is longer than any ISO14443A cascade level.
    #[must_use]
    pub fn is_oversized(&self) -> bool {
        self.0.len() > MAX_UID_LENGTH
    }

    /// Full upper-case hex encoding, without the event buffer limit.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02X}", b)).collect()
    }
}

impl fmt::Display for CardUid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for CardUid {
    type Err = Error;

    /// Parse a hex string such as `"DEADBEEF"` or `"de:ad:be:ef"`.
    ///
    /// Colons, dashes and whitespace between byte pairs are ignored.
    fn from_str(s: &str) -> Result<Self> {
        let digits: Vec<u8> = s
            .bytes()
            .filter(|c| !matches!(c, b':' | b'-' | b' ' | b'\t'))
            .collect();

        if digits.len() % 2 != 0 {
            return Err(Error::InvalidUid(format!(
                "UID must have an even number of hex digits: {s}"
            )));
        }

        let bytes = digits
            .chunks(2)
            .map(|pair| {
                std::str::from_utf8(pair)
                    .ok()
                    .and_then(|p| u8::from_str_radix(p, 16).ok())
                    .ok_or_else(|| Error::InvalidUid(format!("Invalid hex in UID: {s}")))
            })
            .collect::<Result<Vec<u8>>>()?;

        CardUid::new(bytes)
    }
}

/// Normalized card event handed to the consumer.
///
/// Wire shape: `{"reader_id": 1, "uid": "DEADBEEF"}`. The `uid` buffer always
/// holds a NUL terminator, so it can be handed unchanged to C consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RfidEvent {
    /// Reader that detected the card.
    pub reader_id: ReaderId,

    /// Upper-case hex UID, NUL-terminated.
    pub uid: UidText<UID_TEXT_CAPACITY>,
}

impl RfidEvent {
    /// Normalize a freshly read UID into an event for `reader_id`.
    #[must_use]
    pub fn new(reader_id: ReaderId, uid: &CardUid) -> Self {
        Self {
            reader_id,
            uid: UidText::encode(uid.as_bytes()),
        }
    }

    /// Get the UID text.
    #[must_use]
    pub fn uid_str(&self) -> &str {
        self.uid.as_str()
    }
}

impl fmt::Display for RfidEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "reader {} uid {}", self.reader_id, self.uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", 1)]
    #[case("2", 2)]
    #[case(" 2 ", 2)]
    fn test_reader_id_valid(#[case] input: &str, #[case] expected: u8) {
        let id: ReaderId = input.parse().unwrap();
        assert_eq!(id.as_u8(), expected);
        assert_eq!(id.to_string(), expected.to_string());
    }

    #[rstest]
    #[case("0")] // below range
    #[case("3")] // above range
    #[case("x")] // non-numeric
    fn test_reader_id_invalid(#[case] input: &str) {
        let result: Result<ReaderId> = input.parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_reader_id_index() {
        assert_eq!(ReaderId::FIRST.index(), 0);
        assert_eq!(ReaderId::SECOND.index(), 1);
        assert!(ReaderId::FIRST < ReaderId::SECOND);
    }

    #[rstest]
    #[case("DEADBEEF", &[0xDE, 0xAD, 0xBE, 0xEF])]
    #[case("de:ad:be:ef", &[0xDE, 0xAD, 0xBE, 0xEF])]
    #[case("04-A2-2B-1A-3C-5D-80", &[0x04, 0xA2, 0x2B, 0x1A, 0x3C, 0x5D, 0x80])]
    fn test_card_uid_parse(#[case] input: &str, #[case] expected: &[u8]) {
        let uid: CardUid = input.parse().unwrap();
        assert_eq!(uid.as_bytes(), expected);
    }

    #[rstest]
    #[case("")] // empty
    #[case("ABC")] // odd digit count
    #[case("ZZZZ")] // not hex
    fn test_card_uid_parse_invalid(#[case] input: &str) {
        let result: Result<CardUid> = input.parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_card_uid_empty_rejected() {
        assert!(matches!(CardUid::new(vec![]), Err(Error::InvalidUid(_))));
    }

    #[test]
    fn test_card_uid_oversized() {
        let uid = CardUid::new(vec![0x01; 12]).unwrap();
        assert!(uid.is_oversized());
        assert_eq!(uid.to_hex().len(), 24);
    }

    #[test]
    fn test_event_from_uid() {
        let uid = CardUid::new(vec![0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
        let event = RfidEvent::new(ReaderId::FIRST, &uid);

        assert_eq!(event.reader_id, ReaderId::FIRST);
        assert_eq!(event.uid_str(), "DEADBEEF");
        assert_eq!(event.to_string(), "reader 1 uid DEADBEEF");
    }

    #[test]
    fn test_event_truncates_oversized_uid() {
        let uid = CardUid::new(vec![0xAB; 11]).unwrap();
        let event = RfidEvent::new(ReaderId::SECOND, &uid);

        assert_eq!(event.uid.len(), UID_TEXT_CAPACITY - 1);
        assert_eq!(event.uid.as_bytes_with_nul().last(), Some(&0));
    }

    #[test]
    fn test_event_serialization() {
        let uid = CardUid::new(vec![0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
        let event = RfidEvent::new(ReaderId::SECOND, &uid);

        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"reader_id":2,"uid":"DEADBEEF"}"#);

        let deserialized: RfidEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[test]
    fn test_event_deserialization_rejects_unknown_reader() {
        let result: std::result::Result<RfidEvent, _> =
            serde_json::from_str(r#"{"reader_id":3,"uid":"DEADBEEF"}"#);
        assert!(result.is_err());
    }
}
