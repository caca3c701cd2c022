//! Serialization adapter between domain objects and stored blobs.

use serde::de::DeserializeOwned;
use serde::Serialize;
use stash_core::{StashError, StashResult};

/// Raw bytes as stored in the cache backend.
pub type Blob = Vec<u8>;

/// Converts values to and from the cache wire format.
///
/// `decode(encode(x))` must equal `x` for every supported shape. Errors are
/// reported as [`StashError::Serialization`]; the cache-aside layer turns an
/// encode failure into a skipped populate and a decode failure into a miss.
pub trait Codec: Send + Sync + 'static {
    /// Encodes a value into a blob.
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> StashResult<Blob>;

    /// Decodes a blob into a value of the target type.
    fn decode<T: DeserializeOwned>(&self, blob: &[u8]) -> StashResult<T>;
}

/// JSON codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> StashResult<Blob> {
        serde_json::to_vec(value).map_err(StashError::from)
    }

    fn decode<T: DeserializeOwned>(&self, blob: &[u8]) -> StashResult<T> {
        serde_json::from_slice(blob).map_err(StashError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde::Serializer;
    use stash_core::{User, UserId};

    #[test]
    fn test_user_round_trip() {
        let codec = JsonCodec;
        let user = User::new(UserId::new(42), "ann", "Ann", Some("ann@example.com".to_string()));

        let blob = codec.encode(&user).unwrap();
        let decoded: User = codec.decode(&blob).unwrap();

        assert_eq!(decoded, user);
    }

    #[test]
    fn test_scalar_and_option_round_trip() {
        let codec = JsonCodec;
        assert!(codec.decode::<bool>(&codec.encode(&true).unwrap()).unwrap());
        let none: Option<String> = None;
        assert_eq!(codec.decode::<Option<String>>(&codec.encode(&none).unwrap()).unwrap(), None);
    }

    #[test]
    fn test_decode_garbage_is_serialization_error() {
        let result = JsonCodec.decode::<User>(b"\x00not json");
        assert!(matches!(result, Err(StashError::Serialization(_))));
    }

    #[test]
    fn test_decode_wrong_shape_is_serialization_error() {
        let blob = JsonCodec.encode(&"just a string").unwrap();
        assert!(matches!(JsonCodec.decode::<User>(&blob), Err(StashError::Serialization(_))));
    }

    #[derive(Debug)]
    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("refused"))
        }
    }

    #[test]
    fn test_encode_failure_is_serialization_error() {
        assert!(matches!(JsonCodec.encode(&Unencodable), Err(StashError::Serialization(_))));
    }
}
