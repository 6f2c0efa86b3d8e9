use std::panic::Location;

use thiserror::Error;

/// `BitTorrent` Info Hash v1: the 20-byte SHA-1 over a torrent's metainfo
/// dictionary. It identifies the swarm.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Default, PartialOrd, Ord)]
pub struct InfoHash(pub [u8; 20]);

pub const INFO_HASH_BYTES_LEN: usize = 20;

impl InfoHash {
    /// Returns the `InfoHash` internal byte array.
    #[must_use]
    pub fn bytes(&self) -> [u8; 20] {
        self.0
    }

    /// Returns the `InfoHash` as a 40-character hex string.
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for InfoHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut chars = [0u8; 40];
        binascii::bin2hex(&self.0, &mut chars).expect("it should fit in the output buffer");
        write!(f, "{}", std::str::from_utf8(&chars).expect("hex digits are valid UTF-8"))
    }
}

impl std::str::FromStr for InfoHash {
    type Err = binascii::ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut i = Self::default();
        if s.len() != 40 {
            return Err(binascii::ConvertError::InvalidInputLength);
        }
        binascii::hex2bin(s.as_bytes(), &mut i.0)?;
        Ok(i)
    }
}

impl std::convert::From<[u8; 20]> for InfoHash {
    fn from(bytes: [u8; 20]) -> Self {
        InfoHash(bytes)
    }
}

/// Errors that can occur when converting from a `Vec<u8>` to an `InfoHash`.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// Not enough bytes for infohash. An infohash is 20 bytes.
    #[error("not enough bytes for infohash: {message} {location}")]
    NotEnoughBytes {
        location: &'static Location<'static>,
        message: String,
    },
    /// Too many bytes for infohash. An infohash is 20 bytes.
    #[error("too many bytes for infohash: {message} {location}")]
    TooManyBytes {
        location: &'static Location<'static>,
        message: String,
    },
}

impl TryFrom<Vec<u8>> for InfoHash {
    type Error = ConversionError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        if bytes.len() < INFO_HASH_BYTES_LEN {
            return Err(ConversionError::NotEnoughBytes {
                location: Location::caller(),
                message: format! {"got {} bytes, expected {}", bytes.len(), INFO_HASH_BYTES_LEN},
            });
        }
        if bytes.len() > INFO_HASH_BYTES_LEN {
            return Err(ConversionError::TooManyBytes {
                location: Location::caller(),
                message: format! {"got {} bytes, expected {}", bytes.len(), INFO_HASH_BYTES_LEN},
            });
        }

        let mut data = [0u8; 20];
        data.copy_from_slice(&bytes);
        Ok(Self(data))
    }
}

impl serde::ser::Serialize for InfoHash {
    fn serialize<S: serde::ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::de::Deserialize<'de> for InfoHash {
    fn deserialize<D: serde::de::Deserializer<'de>>(des: D) -> Result<Self, D::Error> {
        des.deserialize_str(InfoHashVisitor)
    }
}

struct InfoHashVisitor;

impl<'v> serde::de::Visitor<'v> for InfoHashVisitor {
    type Value = InfoHash;

    fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "a 40 character long hash")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if v.len() != 40 {
            return Err(serde::de::Error::invalid_value(
                serde::de::Unexpected::Str(v),
                &"a 40 character long string",
            ));
        }

        let mut res = InfoHash::default();

        if binascii::hex2bin(v.as_bytes(), &mut res.0).is_err() {
            return Err(serde::de::Error::invalid_value(
                serde::de::Unexpected::Str(v),
                &"a hexadecimal string",
            ));
        };
        Ok(res)
    }
}

/// for testing: derives a deterministic infohash from a number.
impl std::convert::From<&i32> for InfoHash {
    fn from(n: &i32) -> InfoHash {
        let n = n.to_le_bytes();
        InfoHash([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, n[0], n[1], n[2], n[3]])
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::InfoHash;

    #[test]
    fn it_should_be_parsed_from_a_40_character_hex_string() {
        let info_hash = InfoHash::from_str("3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0").unwrap();

        assert_eq!(info_hash.to_hex_string(), "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0");
    }

    #[test]
    fn it_should_reject_hex_strings_with_the_wrong_length() {
        assert!(InfoHash::from_str("3b245504cf5f11bbdbe1201cea6a6bf45aee1bc").is_err());
        assert!(InfoHash::from_str("3b245504cf5f11bbdbe1201cea6a6bf45aee1bc000").is_err());
    }

    #[test]
    fn it_should_reject_strings_with_non_hex_characters() {
        assert!(InfoHash::from_str("ZZ245504cf5f11bbdbe1201cea6a6bf45aee1bc0").is_err());
    }

    #[test]
    fn it_should_be_converted_from_a_byte_array() {
        let info_hash = InfoHash::from([255u8; 20]);

        assert_eq!(
            info_hash,
            InfoHash::from_str("ffffffffffffffffffffffffffffffffffffffff").unwrap()
        );
    }

    #[test]
    fn it_should_fail_trying_to_convert_from_a_byte_vector_with_the_wrong_number_of_bytes() {
        assert!(InfoHash::try_from([0u8; 19].to_vec()).is_err());
        assert!(InfoHash::try_from([0u8; 21].to_vec()).is_err());
    }
}
