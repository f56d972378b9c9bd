use crate::domain_knowledge::INFO_HASH_LEN;
use crate::our_error::{OurError, Result};
use bendy::decoding::Object;
use juicy_bencode::BencodeItemView;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};
use sha1::{Digest, Sha1};
use std::fmt;
use std::num::NonZeroU64;
use std::path::Path;
use std::str;

/// Everything but alphanumerics and `_.-~/` gets escaped in a tracker query
const TRACKER_QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

#[derive(PartialEq, Eq, Hash, Clone, Copy)]
pub struct InfoHash(pub [u8; INFO_HASH_LEN]);

impl InfoHash {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The form trackers expect in the `info_hash` query parameter, lowercased the way
    /// qBittorrent sends it.
    pub fn url_encoded(&self) -> String {
        percent_encode(&self.0, TRACKER_QUERY).to_string().to_lowercase()
    }
}

impl fmt::Debug for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// The only three things the simulation cares about in a torrent, plus the info hash for display
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ContentMetadata {
    pub name: String,

    /// Number of bytes for each piece, barring the last one
    pub piece_size: NonZeroU64,

    /// Sum of the declared lengths of every file
    pub total_size: u64,

    pub file_count: usize,

    pub info_hash: InfoHash,
}

impl ContentMetadata {
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        parse_torrent(&bytes)
    }
}

fn non_negative(field: &'static str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| OurError::InvalidField {
        field,
        expected: "must not be negative",
    })
}

/// Parses a torrent metadata file into the values the simulation needs
pub fn parse_torrent(metadata_file: &[u8]) -> Result<ContentMetadata> {
    let (_, mut torrent) = juicy_bencode::parse_bencode_dict(metadata_file).map_err(|e| {
        // the error type has a reference on the input, we don't want that
        OurError::MalformedBencode(format!("{e:?}"))
    })?;

    let Some(info) = torrent.remove(b"info".as_slice()) else {
        return Err(OurError::MissingField("info"));
    };
    let BencodeItemView::Dictionary(mut info) = info else {
        return Err(OurError::InvalidField {
            field: "info",
            expected: "needs to be a dict",
        });
    };

    let name = match info.remove(b"name".as_slice()) {
        Some(BencodeItemView::ByteString(name)) => str::from_utf8(name)
            .map_err(|_| OurError::InvalidField {
                field: "name",
                expected: "needs to be valid utf-8",
            })?
            .to_owned(),
        Some(_) => {
            return Err(OurError::InvalidField {
                field: "name",
                expected: "needs to be a string",
            });
        }
        None => return Err(OurError::MissingField("name")),
    };

    let piece_size = match info.remove(b"piece length".as_slice()) {
        Some(BencodeItemView::Integer(len)) => {
            let positive = u64::try_from(len).ok().and_then(NonZeroU64::new);
            positive.ok_or(OurError::InvalidPieceSize(len))?
        }
        Some(_) => {
            return Err(OurError::InvalidField {
                field: "piece length",
                expected: "needs to be an integer",
            });
        }
        None => return Err(OurError::MissingField("piece length")),
    };

    let mut lengths = vec![];
    if let Some(BencodeItemView::List(files)) = info.remove(b"files".as_slice()) {
        for file in files.iter() {
            let BencodeItemView::Dictionary(entries) = file else {
                return Err(OurError::InvalidField {
                    field: "files",
                    expected: "needs to be a list of dicts",
                });
            };
            let Some(BencodeItemView::Integer(length)) = entries.get(b"length".as_slice()) else {
                return Err(OurError::MissingField("files.length"));
            };
            lengths.push(non_negative("files.length", *length)?);
        }
    } else if let Some(BencodeItemView::Integer(length)) = info.remove(b"length".as_slice()) {
        lengths.push(non_negative("length", length)?);
    } else {
        return Err(OurError::MissingField("files or length"));
    }

    let total_size = lengths
        .iter()
        .try_fold(0u64, |acc, &len| acc.checked_add(len))
        .ok_or(OurError::InvalidField {
            field: "files.length",
            expected: "total must fit in 64 bits",
        })?;
    let info_hash = compute_info_hash(metadata_file)?;

    Ok(ContentMetadata {
        name,
        piece_size,
        total_size,
        file_count: lengths.len(),
        info_hash,
    })
}

/// Computes the info hash of a torrent metadata file
fn compute_info_hash(input: &[u8]) -> Result<InfoHash> {
    let bendy_err = |e: bendy::decoding::Error| OurError::BendyDecodeError(format!("{e:?}"));

    let mut decoder = bendy::decoding::Decoder::new(input);
    let Some(Object::Dict(mut dict)) = decoder.next_object().map_err(bendy_err)? else {
        return Err(OurError::InvalidField {
            field: "torrent",
            expected: "needs to be a dict",
        });
    };

    while let Some((key, val)) = dict.next_pair().map_err(bendy_err)? {
        if key == b"info" {
            let buf = match val {
                Object::List(list_decoder) => list_decoder.into_raw().map_err(bendy_err)?,
                Object::Dict(dict_decoder) => dict_decoder.into_raw().map_err(bendy_err)?,
                Object::Integer(i) => i.as_bytes(),
                Object::Bytes(items) => items,
            };
            let digest = Sha1::digest(buf);
            let mut hash = [0u8; INFO_HASH_LEN];
            hash.copy_from_slice(digest.as_slice());
            return Ok(InfoHash(hash));
        }
    }

    Err(OurError::MissingField("info"))
}
